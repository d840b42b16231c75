pub mod dto;
pub mod gacha;
pub mod identity;

pub use dto::{RenderedRow, ViewerEvent, ViewerStateResponse};
pub use gacha::{
    parse_date_bound, DateRange, GachaEnvelope, HistoryResult, PullCategory, PullRecord,
    SUCCESS_CODE,
};
pub use identity::{IdentityState, SharedIdentity, Uid, INACTIVE_UID};
