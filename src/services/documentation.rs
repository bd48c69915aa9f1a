use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Duel Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::connect,
        crate::routes::game::current_game,
        crate::routes::game::game_view,
        crate::routes::answer::submit_answer,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::GameView,
            crate::dto::game::PlayerProgressView,
            crate::dto::game::AnswerView,
            crate::dto::game::QuestionView,
            crate::dto::game::GameStatusDto,
            crate::dto::game::AnswerStatusDto,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::AnswerRecord,
        )
    ),
    tags(
        (name = "matchmaking", description = "Pairing accounts into duels"),
        (name = "game", description = "Participant-scoped game snapshots"),
        (name = "answers", description = "Answer submission and scoring"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
