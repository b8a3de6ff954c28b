pub mod caching;
pub mod http;
pub mod news;
pub mod rates;
pub mod trend;
pub mod util;

pub use http::ReqwestClient;
pub use news::Rss2JsonNewsProvider;
pub use rates::OpenErApiProvider;
pub use trend::FrankfurterProvider;
