use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoAnswerDocument, MongoGameDocument, MongoPlayerDocument, MongoQuestionDocument,
        STATUS_FINISHED, STATUS_PENDING, doc_id, uuid_as_binary,
    },
};
use crate::dao::{
    duel_store::DuelStore,
    models::{AnswerEntity, GameEntity, PlayerEntity, QuestionEntity},
    storage::StorageResult,
};

const QUESTION_COLLECTION_NAME: &str = "questions";
const GAME_COLLECTION_NAME: &str = "games";
const PLAYER_COLLECTION_NAME: &str = "players";
const ANSWER_COLLECTION_NAME: &str = "answers";

/// MongoDB implementation of [`DuelStore`].
#[derive(Clone)]
pub struct MongoDuelStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoDuelStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        // Matchmaking scans the waiting pool and the per-account open game by
        // status, so both filters get an index.
        let games = database.collection::<MongoGameDocument>(GAME_COLLECTION_NAME);
        let status_index = mongodb::IndexModel::builder()
            .keys(doc! {"status": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_status_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(status_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "status",
                source,
            })?;

        let accounts_index = mongodb::IndexModel::builder()
            .keys(doc! {"accounts": 1, "status": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_accounts_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(accounts_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "accounts,status",
                source,
            })?;

        // An answer row exists at most once per (player, question) pair.
        let answers = database.collection::<MongoAnswerDocument>(ANSWER_COLLECTION_NAME);
        let answer_index = mongodb::IndexModel::builder()
            .keys(doc! {"player_id": 1, "question_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("answer_player_question_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        answers
            .create_index(answer_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ANSWER_COLLECTION_NAME,
                index: "player_id,question_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn question_collection(&self) -> Collection<MongoQuestionDocument> {
        self.database()
            .await
            .collection::<MongoQuestionDocument>(QUESTION_COLLECTION_NAME)
    }

    async fn game_collection(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn player_collection(&self) -> Collection<MongoPlayerDocument> {
        self.database()
            .await
            .collection::<MongoPlayerDocument>(PLAYER_COLLECTION_NAME)
    }

    async fn answer_collection(&self) -> Collection<MongoAnswerDocument> {
        self.database()
            .await
            .collection::<MongoAnswerDocument>(ANSWER_COLLECTION_NAME)
    }

    async fn upsert_question(&self, question: QuestionEntity) -> MongoResult<()> {
        let id = question.id;
        let document: MongoQuestionDocument = question.into();
        let collection = self.question_collection().await;
        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveQuestion { id, source })?;
        Ok(())
    }

    async fn list_published_questions(&self) -> MongoResult<Vec<QuestionEntity>> {
        let collection = self.question_collection().await;
        let documents: Vec<MongoQuestionDocument> = collection
            .find(doc! {"published": true})
            .await
            .map_err(|source| MongoDaoError::ListQuestions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListQuestions { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_question(&self, id: Uuid) -> MongoResult<Option<QuestionEntity>> {
        let collection = self.question_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadQuestion { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let collection = self.game_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(())
    }

    /// Replace the game document iff the stored revision still matches.
    ///
    /// The revision filter is what makes the pending-join and finish
    /// transitions single-writer: the second concurrent writer matches zero
    /// documents and observes `modified_count == 0`.
    async fn update_game(&self, game: GameEntity, expected_revision: u64) -> MongoResult<bool> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let collection = self.game_collection().await;
        let result = collection
            .replace_one(
                doc! {"_id": uuid_as_binary(id), "revision": expected_revision as i64},
                &document,
            )
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(result.modified_count > 0)
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let collection = self.game_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn find_waiting_game(&self) -> MongoResult<Option<GameEntity>> {
        let collection = self.game_collection().await;
        let document = collection
            .find_one(doc! {"status": STATUS_PENDING})
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;
        Ok(document.map(Into::into))
    }

    async fn find_open_game_for(&self, account_id: Uuid) -> MongoResult<Option<GameEntity>> {
        let collection = self.game_collection().await;
        let document = collection
            .find_one(doc! {
                "accounts": uuid_as_binary(account_id),
                "status": {"$ne": STATUS_FINISHED},
            })
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;
        Ok(document.map(Into::into))
    }

    async fn save_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let id = player.id;
        let document: MongoPlayerDocument = player.into();
        let collection = self.player_collection().await;
        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SavePlayer { id, source })?;
        Ok(())
    }

    async fn delete_player(&self, id: Uuid) -> MongoResult<()> {
        let collection = self.player_collection().await;
        collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeletePlayer { id, source })?;
        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> MongoResult<Option<PlayerEntity>> {
        let collection = self.player_collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadPlayer { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn insert_answer(&self, answer: AnswerEntity) -> MongoResult<()> {
        let id = answer.id;
        let document: MongoAnswerDocument = answer.into();
        let collection = self.answer_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveAnswer { id, source })?;
        Ok(())
    }

    async fn answers_of_player(&self, player_id: Uuid) -> MongoResult<Vec<AnswerEntity>> {
        let collection = self.answer_collection().await;
        let documents: Vec<MongoAnswerDocument> = collection
            .find(doc! {"player_id": uuid_as_binary(player_id)})
            .sort(doc! {"answered_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListAnswers { player_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListAnswers { player_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl DuelStore for MongoDuelStore {
    fn upsert_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_question(question).await.map_err(Into::into) })
    }

    fn list_published_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_published_questions().await.map_err(Into::into) })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question(id).await.map_err(Into::into) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        game: GameEntity,
        expected_revision: u64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(game, expected_revision)
                .await
                .map_err(Into::into)
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn find_waiting_game(&self) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_waiting_game().await.map_err(Into::into) })
    }

    fn find_open_game_for(
        &self,
        account_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_open_game_for(account_id).await.map_err(Into::into) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_player(player).await.map_err(Into::into) })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_player(id).await.map_err(Into::into) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(id).await.map_err(Into::into) })
    }

    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_answer(answer).await.map_err(Into::into) })
    }

    fn answers_of_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.answers_of_player(player_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
