pub mod abandoned_leads;
pub mod daily_metrics;
pub mod followup_dispatch;

pub use abandoned_leads::abandoned_lead_worker;
pub use daily_metrics::daily_metrics_worker;
pub use followup_dispatch::followup_dispatch_worker;
