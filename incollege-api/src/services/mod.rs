pub mod connection_service;
pub mod experience_service;
pub mod job_service;
pub mod messaging_service;
pub mod notification_service;
pub mod password_service;
pub mod preferences_service;
pub mod profile_service;
pub mod token_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;
