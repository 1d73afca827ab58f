/*!
 * Integration tests for the viewer session
 */

use anyhow::Result;

use tei_align::app_config::Config;
use tei_align::extraction::Segment;
use tei_align::rendering::OutputFormat;
use tei_align::viewer::{LoadOutcome, LoadedDocument, ViewerSession};
use crate::common;

fn document(key: &str) -> LoadedDocument {
    LoadedDocument {
        key: key.to_string(),
        title: "t".to_string(),
        segments: vec![Segment::new("seg-1", "src", "")],
    }
}

#[tokio::test]
async fn test_viewerSession_openSingle_shouldLoadDocument() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_sample_tei(temp_dir.path(), "one.xml")?;
    let session = ViewerSession::new(Config::default());

    let outcome = session.open_single(path).await?;

    assert_eq!(outcome, LoadOutcome::Loaded { key: "one.xml".to_string(), segments: 3 });
    assert_eq!(session.active_key().await.as_deref(), Some("one.xml"));
    assert_eq!(session.visible_files().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_viewerSession_failedLoad_shouldKeepPreviousDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let good = common::create_sample_tei(temp_dir.path(), "good.xml")?;
    let bad = common::create_test_file(temp_dir.path(), "bad.xml", "<TEI><text><p>no body</p></text></TEI>")?;
    let session = ViewerSession::new(Config::default());

    session.open_file(good, None).await?;
    let before = session.current().await;

    assert!(session.open_file(bad, None).await.is_err());

    assert_eq!(session.current().await, before);
    assert_eq!(session.active_key().await.as_deref(), Some("good.xml"));
    Ok(())
}

#[tokio::test]
async fn test_viewerSession_staleTicket_shouldBeSuperseded() {
    let session = ViewerSession::new(Config::default());

    let first = session.begin_load();
    let second = session.begin_load();

    assert_eq!(
        session.commit(second, document("second.xml")).await,
        LoadOutcome::Loaded { key: "second.xml".to_string(), segments: 1 }
    );
    assert_eq!(session.commit(first, document("first.xml")).await, LoadOutcome::Superseded);
    assert_eq!(session.current().await.map(|d| d.key), Some("second.xml".to_string()));
}

#[tokio::test]
async fn test_viewerSession_indexFolder_shouldIndexAndFilter() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_sample_tei(temp_dir.path(), "juan1.xml")?;
    common::create_sample_tei(temp_dir.path(), "juan2.xml")?;
    common::create_sample_tei(temp_dir.path(), "preface.xml")?;
    let session = ViewerSession::new(Config::default());

    assert_eq!(session.index_folder(temp_dir.path().to_path_buf()).await?, 3);
    assert!(session.active_key().await.is_none());

    session.set_filter("JUAN").await;
    let keys: Vec<String> = session.visible_files().await.into_iter().map(|f| f.key).collect();
    assert_eq!(keys, vec!["juan1.xml".to_string(), "juan2.xml".to_string()]);

    let outcome = session.open_indexed("juan2.xml").await?;
    assert!(matches!(outcome, LoadOutcome::Loaded { ref key, .. } if key == "juan2.xml"));

    let first = session.open_first().await?;
    assert!(matches!(first, Some(LoadOutcome::Loaded { ref key, .. }) if key == "juan1.xml"));
    Ok(())
}

#[tokio::test]
async fn test_viewerSession_indexEmptyFolder_shouldClearDocument() -> Result<()> {
    let full = common::create_temp_dir()?;
    let path = common::create_sample_tei(full.path(), "a.xml")?;
    let empty = common::create_temp_dir()?;
    let session = ViewerSession::new(Config::default());
    session.open_single(path).await?;

    assert_eq!(session.index_folder(empty.path().to_path_buf()).await?, 0);

    assert!(session.current().await.is_none());
    assert!(session.visible_files().await.is_empty());
    assert_eq!(session.open_first().await?, None);
    Ok(())
}

#[tokio::test]
async fn test_viewerSession_openIndexed_withUnknownKey_shouldFail() {
    let session = ViewerSession::new(Config::default());
    assert!(session.open_indexed("nope.xml").await.is_err());
}

#[tokio::test]
async fn test_viewerSession_renderCurrent_shouldUseDisplayConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_sample_tei(temp_dir.path(), "r.xml")?;
    let mut config = Config::default();
    config.display.show_source = false;
    config.display.batch_size = 1;
    let session = ViewerSession::new(config);

    let mut empty: Vec<u8> = Vec::new();
    assert!(session.render_current(OutputFormat::Text, &mut empty).await.is_err());

    session.open_single(path).await?;
    let mut buffer: Vec<u8> = Vec::new();
    session.render_current(OutputFormat::Markdown, &mut buffer).await?;
    let rendered = String::from_utf8(buffer)?;

    assert!(rendered.starts_with("# 千字文\n"));
    assert!(!rendered.contains("**Original:**"));
    assert!(rendered.contains("**English:** Heaven is dark, earth is yellow"));
    Ok(())
}

#[tokio::test]
async fn test_viewerSession_loadStartedBeforeReindex_shouldBeSuperseded() -> Result<()> {
    let empty = common::create_temp_dir()?;
    let session = ViewerSession::new(Config::default());

    let ticket = session.begin_load();
    assert_eq!(session.index_folder(empty.path().to_path_buf()).await?, 0);

    assert_eq!(session.commit(ticket, document("stale.xml")).await, LoadOutcome::Superseded);
    assert!(session.current().await.is_none());
    assert!(session.active_key().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_viewerSession_loadStartedAfterReindex_shouldCommit() -> Result<()> {
    let folder = common::create_temp_dir()?;
    common::create_sample_tei(folder.path(), "fresh.xml")?;
    let session = ViewerSession::new(Config::default());

    session.index_folder(folder.path().to_path_buf()).await?;
    let ticket = session.begin_load();

    assert_eq!(
        session.commit(ticket, document("fresh.xml")).await,
        LoadOutcome::Loaded { key: "fresh.xml".to_string(), segments: 1 }
    );
    Ok(())
}
