/// Answer submission pipeline, finish detection and speed bonus.
pub mod answer_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Matchmaking queue pairing accounts into duels.
pub mod matchmaking_service;
/// Read access to the published question bank and startup seeding.
pub mod question_bank;
/// Storage persistence supervisor with reconnect handling.
pub mod storage_supervisor;
/// Participant-scoped game view assembly.
pub mod view_service;

#[cfg(test)]
pub(crate) mod test_support;
