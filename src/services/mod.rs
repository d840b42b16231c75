pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod host_page;
pub mod interceptor;
pub mod readiness;
pub mod transport;
pub mod view;

pub use coordinator::Coordinator;
pub use error::GachaError;
pub use fetcher::HistoryFetcher;
pub use interceptor::{InterceptDecision, RequestInterceptor};
pub use readiness::{ReadinessWatcher, WatcherState};
pub use transport::{
    CompletionListener, InboundResponse, OutboundRequest, ReadyState, RequestOrigin,
    SharedTransport, Transport,
};
pub use view::ViewController;
