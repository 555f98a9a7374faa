mod common;

use common::{definition, download_definition, fake_page, settings, Leaderboard, PAGE_SIZE};
use pretty_assertions::assert_eq;
use statscout_core::FilterValue;
use statscout_page::testing::FakePage;
use statscout_page::{ConfigureMode, Configured, PageError};
use statscout_scraper::{ScrapeError, StatPage, TableRecord};
use tempfile::TempDir;

async fn open(site: Leaderboard, dir: &TempDir) -> StatPage<FakePage<Leaderboard>> {
    statscout_core::logging::init_tracing(statscout_core::logging::DEFAULT_FILTER);
    StatPage::open(fake_page(site, dir.path()), definition(), settings(dir.path()))
        .await
        .expect("open leaderboard")
}

async fn current_options(page: &StatPage<FakePage<Leaderboard>>) -> Vec<(String, FilterValue)> {
    let mut options = Vec::new();
    for name in page.list_queries() {
        let value = page.current_option(name.as_str()).await.expect("current option");
        options.push((name.to_string(), value));
    }
    options
}

#[tokio::test]
async fn test_open_dismisses_overlay_and_lists_filters() {
    let dir = TempDir::new().unwrap();
    let page = open(Leaderboard::default(), &dir).await;

    let names: Vec<String> = page.list_queries().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["position", "qualified", "season1", "split"]);
    assert_eq!(page.driver().clicks(), vec![(".ad-close".to_string(), 0)]);
    assert!(!page.snapshot().exists(".ad").unwrap());
}

#[tokio::test]
async fn test_current_option_is_one_of_the_options() {
    let dir = TempDir::new().unwrap();
    let page = open(Leaderboard::default(), &dir).await;

    for (name, current) in current_options(&page).await {
        let options = page.list_options(&name).unwrap();
        assert!(
            options.iter().any(|option| match (option, &current) {
                (FilterValue::Text(option), current) => current.matches(option),
                (option, current) => option == current,
            }),
            "{name}: {current} not in {options:?}"
        );
    }
}

#[tokio::test]
async fn test_configure_round_trips() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;

    assert_eq!(page.configure("position", "ss").await.unwrap(), Configured::Applied);
    assert_eq!(page.current_option("position").await.unwrap(), FilterValue::from("SS"));

    page.configure("split", "Away").await.unwrap();
    assert_eq!(page.current_option("split").await.unwrap(), FilterValue::from("Away"));

    page.configure("qualified", true).await.unwrap();
    assert_eq!(page.current_option("qualified").await.unwrap(), FilterValue::Flag(true));

    let records = page.records().await.unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records.get(0, "Name"), Some("Player 2024-SS-0"));
}

#[tokio::test]
async fn test_filter_behind_submit_is_applied() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;

    page.configure("Season1", "2023").await.unwrap();

    assert_eq!(page.current_option("season1").await.unwrap(), FilterValue::from("2023"));
    assert!(page
        .driver()
        .clicks()
        .contains(&("#apply".to_string(), 0)));
    let records = page.records().await.unwrap();
    assert_eq!(records.get(0, "Name"), Some("Player 2023-All-0"));
}

#[tokio::test]
async fn test_invalid_option_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    let before = current_options(&page).await;
    page.driver().clear_history();

    let err = page.configure("position", "DH").await.unwrap_err();
    assert!(matches!(err, ScrapeError::Page(PageError::InvalidOption { .. })));

    let err = page.configure("qualified", "maybe").await.unwrap_err();
    assert!(matches!(err, ScrapeError::Page(PageError::InvalidOption { .. })));

    assert_eq!(page.driver().click_count(), 0);
    assert_eq!(current_options(&page).await, before);
}

#[tokio::test]
async fn test_reset_restores_initial_options() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    let initial = current_options(&page).await;

    page.configure("position", "C").await.unwrap();
    page.configure("qualified", true).await.unwrap();
    page.configure("season1", "2022").await.unwrap();
    assert_ne!(current_options(&page).await, initial);

    page.reset().await.unwrap();
    assert_eq!(current_options(&page).await, initial);
    assert_eq!(page.driver().navigations().len(), 2);
}

#[tokio::test]
async fn test_switch_already_set_costs_no_clicks() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    page.driver().clear_history();

    let outcome = page.configure("qualified", false).await.unwrap();

    assert_eq!(outcome, Configured::Unchanged);
    assert_eq!(page.driver().click_count(), 0);
}

#[tokio::test]
async fn test_unknown_filter() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;

    assert!(matches!(
        page.list_options("season2"),
        Err(ScrapeError::Page(PageError::UnknownFilter { .. }))
    ));
    assert!(matches!(
        page.current_option("team").await,
        Err(ScrapeError::Page(PageError::UnknownFilter { .. }))
    ));
    assert!(matches!(
        page.configure_with("team", "NYY", ConfigureMode::Combine).await,
        Err(ScrapeError::Page(PageError::UnknownFilter { .. }))
    ));
    assert!(matches!(
        page.apply_quick_split("last-30-days").await,
        Err(ScrapeError::Page(PageError::UnknownFilter { .. }))
    ));
}

#[tokio::test]
async fn test_paged_grid_collects_every_row() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    let site = page.driver().with_site(|site| site.clone());

    let records = page.records().await.unwrap();

    let total = site.total_pages();
    let last = site.row_count() - PAGE_SIZE * (total - 1);
    assert_eq!(total, 3);
    assert_eq!(records.len(), PAGE_SIZE * (total - 1) + last);
    assert_eq!(records.columns(), ["#", "Name", "Team", "HR", "player_id"]);
    assert!(records.rows().iter().all(|row| row.len() == 5));
    assert_eq!(records.get(22, "player_id"), Some("10022"));
    assert_eq!(
        page.driver()
            .clicks()
            .iter()
            .filter(|(selector, _)| selector == ".pager .next")
            .count(),
        2
    );
}

#[tokio::test]
async fn test_paged_grid_scrapes_again() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;

    let first = page.records().await.unwrap();
    let second = page.records().await.unwrap();
    assert_eq!(first.len(), 23);
    assert_eq!(second, first);
    assert_eq!(page.driver().with_site(|site| site.page), 1);

    let path = page.export(None).await.unwrap();
    assert_eq!(TableRecord::read_csv(&path, b',').unwrap(), first);
}

#[tokio::test]
async fn test_single_page_grid() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    page.configure("position", "C").await.unwrap();
    page.driver().clear_history();

    let records = page.records().await.unwrap();
    assert_eq!(records.len(), 7);
    assert_eq!(page.driver().click_count(), 0);
}

#[tokio::test]
async fn test_quick_split() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    assert_eq!(page.list_quick_splits(), vec!["last-7-days"]);

    page.configure("position", "SS").await.unwrap();
    page.apply_quick_split("Last-7-Days").await.unwrap();

    assert_eq!(page.current_option("position").await.unwrap(), FilterValue::from("All"));
    assert_eq!(page.current_option("qualified").await.unwrap(), FilterValue::Flag(true));
}

#[tokio::test]
async fn test_submit_without_control_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let site = Leaderboard {
        renders_submit: false,
        ..Leaderboard::default()
    };
    let mut page = open(site, &dir).await;
    page.driver().clear_history();

    let err = page.configure("season1", "2022").await.unwrap_err();
    assert!(matches!(err, ScrapeError::UpdateUnavailable { .. }));
    assert_eq!(page.driver().click_count(), 0);
    assert_eq!(page.driver().with_site(|site| site.pending_season), 2);
    assert_eq!(page.current_option("season1").await.unwrap(), FilterValue::from("2024"));

    let mut undeclared = definition();
    undeclared.page.submit_button = None;
    let mut page = StatPage::open(
        fake_page(Leaderboard::default(), dir.path()),
        undeclared,
        settings(dir.path()),
    )
    .await
    .unwrap();
    assert!(matches!(
        page.submit().await,
        Err(ScrapeError::UpdateUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_export_table_to_default_path() {
    let dir = TempDir::new().unwrap();
    let mut page = open(Leaderboard::default(), &dir).await;
    page.configure("position", "C").await.unwrap();

    let path = page.export(None).await.unwrap();

    assert_eq!(path.parent(), Some(dir.path()));
    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("batting-leaders_"));
    assert!(file_name.ends_with(".csv"));

    let written = TableRecord::read_csv(&path, b',').unwrap();
    assert_eq!(written, page.records().await.unwrap());
}

#[tokio::test]
async fn test_export_with_bad_timestamp_format() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings(dir.path());
    settings.timestamp_format = "%Q".to_string();
    let mut page = StatPage::open(fake_page(Leaderboard::default(), dir.path()), definition(), settings)
        .await
        .unwrap();

    let err = page.export(None).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Core(_)));

    let destination = dir.path().join("leaders.csv");
    assert_eq!(page.export(Some(&destination)).await.unwrap(), destination);
}

#[tokio::test]
async fn test_unreadable_download_is_removed() {
    let dir = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let site = Leaderboard {
        corrupt_download: true,
        ..Leaderboard::default()
    };
    let mut page = StatPage::open(
        fake_page(site, downloads.path()),
        download_definition(),
        settings(dir.path()),
    )
    .await
    .unwrap();

    let err = page.records().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Csv(_)));
    assert_eq!(std::fs::read_dir(downloads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_export_download_to_destination() {
    let dir = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let mut page = StatPage::open(
        fake_page(Leaderboard::default(), downloads.path()),
        download_definition(),
        settings(dir.path()),
    )
    .await
    .unwrap();

    let records = page.records().await.unwrap();
    assert_eq!(records.len(), 23);
    assert_eq!(records.columns(), ["#", "Name", "Team", "HR"]);

    let destination = dir.path().join("season").join("leaders.csv");
    let path = page.export(Some(&destination)).await.unwrap();

    assert_eq!(path, destination);
    assert_eq!(TableRecord::read_csv(&path, b',').unwrap(), records);
    assert_eq!(std::fs::read_dir(downloads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_into_driver_releases_page() {
    let dir = TempDir::new().unwrap();
    let page = open(Leaderboard::default(), &dir).await;

    let driver = page.into_driver();
    assert_eq!(driver.navigations(), vec!["https://stats.example.com/leaders"]);
}
