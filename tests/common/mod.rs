use uuid::Uuid;
use wine_service::config::AppConfig;
use wine_service::services::MongoDb;
use wine_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("wine_test_{}", Uuid::new_v4().simple());

        let mut config = AppConfig::load().expect("Failed to load configuration");
        config.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept requests
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            client,
        }
    }

    pub async fn add_wine(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/addWine", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_wines(&self) -> Vec<serde_json::Value> {
        self.client
            .get(format!("{}/getWines", self.address))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse wine list")
    }

    pub async fn update_wine(&self, name: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .put(format!("{}/updateWine/{}", self.address, name))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_wine(&self, name: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/removeWine/{}", self.address, name))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
