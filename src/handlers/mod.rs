pub mod calendly;
pub mod health;
pub mod metrics;
pub mod webhooks;

pub use calendly::*;
pub use health::*;
pub use metrics::*;
pub use webhooks::*;
