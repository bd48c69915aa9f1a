use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;

use super::error::{MongoDaoError, MongoResult};

const MAX_PING_ATTEMPTS: u32 = 8;
const INITIAL_PING_DELAY: Duration = Duration::from_millis(200);
const MAX_PING_DELAY: Duration = Duration::from_secs(5);

fn next_delay(current: Duration) -> Duration {
    (current * 2).min(MAX_PING_DELAY)
}

/// Build a client from the parsed options and wait for a successful ping
/// with exponential backoff before handing the database out.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut delay = INITIAL_PING_DELAY;

    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => {
                attempts += 1;
                if attempts >= MAX_PING_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }

    Ok((client, database))
}
