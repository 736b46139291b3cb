pub mod arte;
pub mod discovery;
pub mod einschalten;
pub mod filmpalast;
pub(crate) mod html;
pub mod http;
pub mod kinoger;
pub(crate) mod lenient;
pub mod mediaccc;
pub mod paging;
pub mod serienstream;
pub mod token;
pub mod traits;
pub mod xcine;

pub use arte::ArteAdapter;
pub use discovery::DiscoveryAdapter;
pub use einschalten::EinschaltenAdapter;
pub use filmpalast::FilmpalastAdapter;
pub use http::HttpClient;
pub use kinoger::KinogerAdapter;
pub use mediaccc::MediaCccAdapter;
pub use serienstream::SerienstreamAdapter;
pub use token::LoadToken;
pub use traits::SiteAdapter;
pub use xcine::XcineAdapter;
