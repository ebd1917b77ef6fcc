//! Fetch, parse and normalize the race calendar in one pass.

use std::future::Future;
use tracing::debug;

use super::ScrapeError;
use super::fetcher::Fetcher;
use super::normalize::normalize;
use super::parsers::ContestParser;
use crate::config::ScraperConfig;
use crate::types::RaceRecord;

/// Something that can produce a fresh set of race records
pub trait RaceSource: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<Vec<RaceRecord>, ScrapeError>> + Send;
}

/// Fetcher → ContestParser → normalize
pub struct ScrapePipeline {
    fetcher: Fetcher,
}

impl ScrapePipeline {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
        })
    }

    pub async fn run(&self) -> Result<Vec<RaceRecord>, ScrapeError> {
        let html = self.fetcher.fetch_page().await?;
        debug!(bytes = html.len(), "Fetched race calendar");

        let raw = ContestParser::parse(&html)?;
        debug!(rows = raw.len(), "Parsed race rows");

        Ok(normalize(raw))
    }
}

impl RaceSource for ScrapePipeline {
    fn load(&self) -> impl Future<Output = Result<Vec<RaceRecord>, ScrapeError>> + Send {
        self.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body><table>
        <tr class="rowbackgroundcolor">
            <td>1</td><td><a href="/race/1">高雄富邦馬拉松</a></td><td>路跑</td>
            <td>02/16</td><td>高雄市世運主場館</td><td>42.195K</td><td>主辦</td><td>10/01~11/30</td>
        </tr>
        <tr class="rowbackgroundcolor">
            <td>2</td><td>太魯閣馬拉松</td><td>路跑</td>
            <td>11/09</td><td>花蓮縣秀林鄉</td><td>42.195K</td><td>主辦</td>
        </tr>
    </table></body></html>"#;

    #[tokio::test]
    async fn test_pipeline_produces_normalized_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let config = ScraperConfig {
            url: server.uri(),
            ..Default::default()
        };
        let pipeline = ScrapePipeline::new(&config).unwrap();
        let records = pipeline.load().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "高雄富邦馬拉松");
        assert_eq!(records[0].link, "/race/1");
        assert_eq!(records[0].region_code, 3);
        assert_eq!(records[0].month.as_deref(), Some("02"));
        assert_eq!(records[1].region_code, 4);
        assert_eq!(records[1].month.as_deref(), Some("11"));
    }

    #[tokio::test]
    async fn test_pipeline_propagates_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let config = ScraperConfig {
            url: server.uri(),
            ..Default::default()
        };
        let pipeline = ScrapePipeline::new(&config).unwrap();

        assert!(matches!(
            pipeline.load().await,
            Err(ScrapeError::Status { status: 403 })
        ));
    }
}
