use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors raised by the MongoDB duel store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        attempts: u32,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to save question `{id}`")]
    SaveQuestion {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to load question `{id}`")]
    LoadQuestion {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to list published questions")]
    ListQuestions {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to query games")]
    QueryGames {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to save player `{id}`")]
    SavePlayer {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to delete player `{id}`")]
    DeletePlayer {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to load player `{id}`")]
    LoadPlayer {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to save answer `{id}`")]
    SaveAnswer {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to list answers of player `{player_id}`")]
    ListAnswers {
        player_id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: mongodb::error::Error,
    },
}
