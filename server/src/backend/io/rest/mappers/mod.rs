//! Conversions from domain models to the `shared` DTOs.

pub mod daily_log_mapper;
pub mod feed_mapper;
pub mod kiosk_mapper;
pub mod parent_mapper;
pub mod student_mapper;
pub mod transaction_mapper;

pub use daily_log_mapper::DailyLogMapper;
pub use feed_mapper::FeedMapper;
pub use kiosk_mapper::KioskMapper;
pub use parent_mapper::ParentMapper;
pub use student_mapper::StudentMapper;
pub use transaction_mapper::TransactionMapper;
