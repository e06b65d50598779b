pub mod background_jobs;
pub mod effects;
pub mod error;
pub mod goal_service;
pub mod job_service;
pub mod matching_service;
pub mod notification_service;
pub mod payment_provider;
pub mod payment_service;
