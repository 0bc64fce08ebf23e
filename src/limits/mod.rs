pub mod increase;
pub mod shared;
pub mod utilization;

pub use increase::{latest_record, next_limit_increase_date, validate_frequency};
pub use shared::{
    aggregate, available_credit, effective_limit, group_for, overall_position, total_limit, total_usage,
    SharedLimitGroup,
};
pub use utilization::{utilization_rate, utilization_state, LimitPosition};
