//! End-to-end refresh scenarios against a file-backed store.
//!
//! These tests drive a full refresh through `RefreshOrchestrator` with an
//! in-process page source, then read the results back through the store
//! and the displayed list.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use vaxmap_core::api::ApiError;
use vaxmap_core::models::{CenterPage, RemoteCenterRecord};
use vaxmap_core::{
    CenterSource, CenterStore, DisplayedCenters, MarkerColor, ProgressState, RefreshOptions,
    RefreshOrchestrator, VaccinationCenter,
};

const CATEGORIES: [&str; 3] = ["중앙/권역", "지역", "임시"];

/// Serves `per_page` generated records for every page, except `failing_page`
/// which answers with an HTTP 500.
#[derive(Clone)]
struct GeneratedPages {
    per_page: u32,
    failing_page: Option<u32>,
}

fn record(id: i64) -> RemoteCenterRecord {
    RemoteCenterRecord {
        id,
        center_name: format!("코로나19 예방접종센터 {}", id),
        sido: "서울특별시".to_string(),
        sigungu: "중구".to_string(),
        facility_name: format!("시설 {}", id),
        zip_code: "04562".to_string(),
        address: format!("서울특별시 중구 을지로 {}", id),
        lat: format!("{}", 37.0 + id as f64 / 1000.0),
        lng: format!("{}", 127.0 + id as f64 / 1000.0),
        created_at: "2021-03-03 08:00:00".to_string(),
        updated_at: "2021-07-16 04:55:08".to_string(),
        center_type: CATEGORIES[id as usize % CATEGORIES.len()].to_string(),
        org: "기관".to_string(),
        phone_number: "02-2260-7114".to_string(),
    }
}

impl CenterSource for GeneratedPages {
    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<CenterPage, ApiError>> + Send {
        let this = self.clone();
        async move {
            // Later pages answer first so inserts arrive out of page order
            tokio::time::sleep(Duration::from_millis(200 - page as u64 * 10)).await;
            if this.failing_page == Some(page) {
                return Err(ApiError::from_status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    "",
                ));
            }
            let first = ((page - 1) * this.per_page) as i64 + 1;
            let data: Vec<_> = (first..first + this.per_page as i64).map(record).collect();
            Ok(CenterPage {
                page,
                per_page,
                total_count: 284,
                current_count: data.len() as u32,
                match_count: 284,
                data,
            })
        }
    }
}

fn open_store(dir: &tempfile::TempDir) -> Arc<CenterStore> {
    Arc::new(CenterStore::open(dir.path().join("centers.json")).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_two_pages_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let displayed = DisplayedCenters::new();
    let source = GeneratedPages { per_page: 10, failing_page: None };
    let orch = RefreshOrchestrator::new(source, Arc::clone(&store), displayed.clone())
        .with_paging(2, 10);

    let states: Vec<ProgressState> = orch
        .refresh(RefreshOptions::default())
        .unwrap()
        .collect()
        .await;
    assert_eq!(states.iter().filter(|s| s.done).count(), 1);
    assert_eq!(orch.count(), 20);

    displayed.begin_collecting(&store);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let shown = displayed.snapshot();
    assert_eq!(shown.len(), 20);
    let ids: HashSet<i64> = shown.iter().map(|c| c.id).collect();
    assert_eq!(ids, (1..=20).collect::<HashSet<i64>>());

    for center in &shown {
        let expected = VaccinationCenter::try_from(record(center.id)).unwrap();
        assert_eq!(center, &expected);
    }

    // Reopening the file yields the same rows
    drop(orch);
    let reopened = CenterStore::open(dir.path().join("centers.json")).unwrap();
    assert_eq!(reopened.count(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_failed_page_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let source = GeneratedPages { per_page: 10, failing_page: Some(3) };
    let orch = RefreshOrchestrator::new(source, Arc::clone(&store), DisplayedCenters::new());

    let states: Vec<ProgressState> = orch
        .refresh(RefreshOptions::default())
        .unwrap()
        .collect()
        .await;

    assert_eq!(states.last(), Some(&ProgressState::complete()));
    assert_eq!(store.count(), 90);
    assert!((21..=30).all(|id| store.get(id).is_none()));
    assert!(!orch.is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_marker_colors_follow_categories() {
    let store = Arc::new(CenterStore::in_memory());
    let displayed = DisplayedCenters::new();
    let source = GeneratedPages { per_page: 3, failing_page: None };
    let orch = RefreshOrchestrator::new(source, Arc::clone(&store), displayed.clone())
        .with_paging(1, 3);

    orch.refresh(RefreshOptions::default())
        .unwrap()
        .collect::<Vec<_>>()
        .await;
    displayed.begin_collecting(&store);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // ids 1, 2, 3 map to "지역", "임시", "중앙/권역"
    assert_eq!(displayed.select(1).unwrap().marker_color(), MarkerColor::Blue);
    assert_eq!(displayed.select(2).unwrap().marker_color(), MarkerColor::Magenta);
    assert_eq!(displayed.select(3).unwrap().marker_color(), MarkerColor::Transparent);
}

#[tokio::test(start_paused = true)]
async fn test_warm_store_skips_network() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    store
        .insert(&[VaccinationCenter::try_from(record(1)).unwrap()])
        .unwrap();

    let source = GeneratedPages { per_page: 10, failing_page: Some(1) };
    let orch = RefreshOrchestrator::new(source, Arc::clone(&store), DisplayedCenters::new());

    let states: Vec<ProgressState> = orch
        .refresh(RefreshOptions { skip_remote_fetch: true, slow_mode: false })
        .unwrap()
        .collect()
        .await;

    assert!(states.iter().all(|s| s.done || s.progress != 0.8));
    assert_eq!(store.count(), 1);
}
