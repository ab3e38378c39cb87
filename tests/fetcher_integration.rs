//! Integration tests for the feed fetcher against a local HTTP server.

mod common;

use common::{quick_fetch_config, rss, LogCapture, MockServer, MockState};
use news_digest::config::FetchConfig;
use news_digest::rss::fingerprint;
use news_digest::{FeedFetcher, FeedSource};

fn state_with_feed(name: &str, xml: String) -> MockState {
    let mut state = MockState::default();
    state.feeds.insert(name.to_string(), xml);
    state
}

#[tokio::test]
async fn test_fetch_items_from_rss() {
    let xml = rss(&[
        ("A&amp;B &lt;b&gt;News&lt;/b&gt;", "http://x/1", "&lt;p&gt;Lead&lt;/p&gt;"),
        ("Second", "http://x/2", ""),
    ]);
    let server = MockServer::start(state_with_feed("world", xml)).await;
    let fetcher = FeedFetcher::new(&quick_fetch_config()).unwrap();

    let items = fetcher.fetch_items(&server.feed_url("world")).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "A&B News");
    assert_eq!(items[0].link, "http://x/1");
    assert_eq!(items[0].description, "Lead");
    assert_eq!(items[0].fingerprint, fingerprint("A&B News", "http://x/1"));
    assert_eq!(items[1].title, "Second");
    assert_eq!(server.hits("world"), 1);
}

#[tokio::test]
async fn test_fetch_sends_browser_headers() {
    let server = MockServer::start(state_with_feed("world", rss(&[]))).await;
    let config = quick_fetch_config();
    let fetcher = FeedFetcher::new(&config).unwrap();

    assert!(fetcher.fetch(&server.feed_url("world")).await.is_some());

    let headers = server.request_headers();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].0, config.user_agent);
    assert_eq!(headers[0].1, config.accept);
}

#[tokio::test]
async fn test_fetch_gives_up_after_repeated_503() {
    let mut state = state_with_feed("down", rss(&[("T", "http://x/1", "")]));
    state.failures.insert("down".to_string(), usize::MAX);
    let server = MockServer::start(state).await;
    let fetcher = FeedFetcher::new(&quick_fetch_config()).unwrap();
    let logs = LogCapture::default();
    let _guard = logs.install();

    let url = server.feed_url("down");
    assert!(fetcher.fetch(&url).await.is_none());
    assert_eq!(server.hits("down"), 3);

    let output = logs.contents();
    for attempt in 1..=3 {
        assert!(output.contains(&format!("Fetch attempt {attempt}/3 failed for {url}")));
    }
    assert!(output.contains("503"));
    assert!(output.contains(&format!("Giving up on {url} after 3 attempt(s)")));

    let items = fetcher.fetch_items(&server.feed_url("down")).await;
    assert!(items.is_empty());
    assert_eq!(server.hits("down"), 6);
}

#[tokio::test]
async fn test_fetch_recovers_after_transient_failure() {
    let mut state = state_with_feed("flaky", rss(&[("T", "http://x/1", "")]));
    state.failures.insert("flaky".to_string(), 2);
    let server = MockServer::start(state).await;
    let fetcher = FeedFetcher::new(&quick_fetch_config()).unwrap();

    let items = fetcher.fetch_items(&server.feed_url("flaky")).await;

    assert_eq!(items.len(), 1);
    assert_eq!(server.hits("flaky"), 3);
}

#[tokio::test]
async fn test_fetch_not_found_is_retried_then_absent() {
    let server = MockServer::start(MockState::default()).await;
    let fetcher = FeedFetcher::new(&quick_fetch_config()).unwrap();

    assert!(fetcher.fetch(&server.feed_url("missing")).await.is_none());
    assert_eq!(server.hits("missing"), 3);
}

#[tokio::test]
async fn test_malformed_feed_contributes_nothing() {
    let server =
        MockServer::start(state_with_feed("broken", "<html>not a feed".to_string())).await;
    let fetcher = FeedFetcher::new(&quick_fetch_config()).unwrap();
    let logs = LogCapture::default();
    let _guard = logs.install();

    let url = server.feed_url("broken");
    let items = fetcher.fetch_items(&url).await;

    assert!(items.is_empty());
    // A parse failure is not retried.
    assert_eq!(server.hits("broken"), 1);
    assert!(logs
        .contents()
        .contains(&format!("Could not parse feed {url}")));
}

#[tokio::test]
async fn test_oversized_feed_is_rejected() {
    let padding = "x".repeat(4096);
    let xml = rss(&[("Big", "http://x/1", padding.as_str())]);
    let server = MockServer::start(state_with_feed("big", xml)).await;
    let config = FetchConfig {
        max_feed_size: 1024,
        ..quick_fetch_config()
    };
    let fetcher = FeedFetcher::new(&config).unwrap();
    let logs = LogCapture::default();
    let _guard = logs.install();

    assert!(fetcher.fetch(&server.feed_url("big")).await.is_none());
    // Counted as a failed attempt, so it is retried like any other.
    assert_eq!(server.hits("big"), 3);
    assert!(logs.contents().contains("feed too large"));
}

#[tokio::test]
async fn test_feed_at_size_limit_is_accepted() {
    let xml = rss(&[("Small", "http://x/1", "")]);
    let config = FetchConfig {
        max_feed_size: xml.len() as u64,
        ..quick_fetch_config()
    };
    let server = MockServer::start(state_with_feed("small", xml)).await;
    let fetcher = FeedFetcher::new(&config).unwrap();

    let items = fetcher.fetch_items(&server.feed_url("small")).await;
    assert_eq!(items.len(), 1);
}
