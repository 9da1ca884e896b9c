// Schema 列表查询 - 按数据库缓存，支持强制刷新

use crate::core::error::FetchResult;
use crate::data::QueryClient;
use crate::models::{DatabaseId, SchemaOption};
use crate::services::api::DatabaseApi;
use std::future::Future;
use std::sync::Arc;

/// Schema 列表查询服务
#[derive(Clone)]
pub struct SchemaFetcher {
    api: Arc<dyn DatabaseApi>,
    client: QueryClient,
}

impl SchemaFetcher {
    pub fn new(api: Arc<dyn DatabaseApi>, client: QueryClient) -> Self {
        Self { api, client }
    }

    /// 读取数据库的 schema 列表（优先使用缓存）
    ///
    /// 数据库标识为空时不发起请求，返回 `None`。
    pub async fn fetch(&self, db_id: &DatabaseId) -> FetchResult<Option<Vec<String>>> {
        if db_id.is_empty() {
            return Ok(None);
        }

        let schemas = self
            .client
            .schemas()
            .get_or_fetch(db_id.clone(), || self.request(db_id, false))
            .await?;
        Ok(Some(schemas))
    }

    /// 以 `force=true` 重新请求 schema 列表并替换缓存
    pub async fn refetch(&self, db_id: &DatabaseId) -> FetchResult<Option<Vec<String>>> {
        if db_id.is_empty() {
            return Ok(None);
        }

        let schemas = self
            .client
            .schemas()
            .refresh(db_id.clone(), self.request(db_id, true))
            .await?;
        Ok(Some(schemas))
    }

    /// 下拉选项形式的 schema 列表
    pub async fn options(&self, db_id: &DatabaseId) -> FetchResult<Option<Vec<SchemaOption>>> {
        let schemas = self.fetch(db_id).await?;
        Ok(schemas.map(|names| names.iter().map(|name| SchemaOption::new(name)).collect()))
    }

    fn request(
        &self,
        db_id: &DatabaseId,
        force: bool,
    ) -> impl Future<Output = FetchResult<Vec<String>>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let db_id = db_id.clone();
        async move {
            let response = api.fetch_schemas(&db_id, force).await?;
            tracing::debug!(
                db_id = %db_id,
                force,
                count = response.result.len(),
                "schema 列表已获取"
            );
            Ok(response.result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_api::{fake_tables, ApiCall, MockDatabaseApi};

    fn setup() -> (Arc<MockDatabaseApi>, SchemaFetcher) {
        let api = Arc::new(MockDatabaseApi::new(&["schema1", "schema2"], fake_tables(2)));
        let fetcher = SchemaFetcher::new(api.clone(), QueryClient::default());
        (api, fetcher)
    }

    #[tokio::test]
    async fn test_fetch_is_cached_per_database() {
        let (api, fetcher) = setup();
        let db1 = DatabaseId::from("db1");

        let first = fetcher.fetch(&db1).await.unwrap();
        let second = fetcher.fetch(&db1).await.unwrap();
        assert_eq!(first, Some(vec!["schema1".to_string(), "schema2".to_string()]));
        assert_eq!(first, second);
        assert_eq!(api.schema_calls(), 1);

        fetcher.fetch(&DatabaseId::from("db2")).await.unwrap();
        assert_eq!(api.schema_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_database_id_skips_request() {
        let (api, fetcher) = setup();
        assert_eq!(fetcher.fetch(&DatabaseId::from("")).await.unwrap(), None);
        assert_eq!(fetcher.refetch(&DatabaseId::from("")).await.unwrap(), None);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refetch_uses_force() {
        let (api, fetcher) = setup();
        let db = DatabaseId::from("db1");

        fetcher.fetch(&db).await.unwrap();
        fetcher.refetch(&db).await.unwrap();
        fetcher.fetch(&db).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                ApiCall::Schemas {
                    db_id: "db1".to_string(),
                    force: false
                },
                ApiCall::Schemas {
                    db_id: "db1".to_string(),
                    force: true
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_options() {
        let (_, fetcher) = setup();
        let options = fetcher
            .options(&DatabaseId::from("db1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(options, vec![SchemaOption::new("schema1"), SchemaOption::new("schema2")]);
    }
}
