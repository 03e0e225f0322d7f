//! View controller behaviour against an in-memory API.

mod common;

use common::{FakeApi, RecordingNavigator};
use std::sync::Arc;
use virt_console::api::ApiError;
use virt_console::navigation::{MenuOption, NavigationState};
use virt_console::views::{
    CreateVmForm, ImageListView, OverviewView, ViewError, ViewPhase, VmDetailView, VmListView,
};

fn image_names(view: &ImageListView) -> Vec<&str> {
    view.images().iter().map(|i| i.name.as_str()).collect()
}

fn vm_names(view: &VmListView) -> Vec<&str> {
    view.vms().iter().map(|v| v.name.as_str()).collect()
}

#[tokio::test]
async fn test_list_mirrors_server_collection_exactly() {
    let api = FakeApi::with_images(&["zeta", "alpha", "mid", "alpha"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());

    assert_eq!(view.phase(), ViewPhase::Unmounted);
    assert_eq!(view.mount().await.unwrap(), 4);

    assert_eq!(image_names(&view), vec!["zeta", "alpha", "mid", "alpha"]);
    assert_eq!(view.phase(), ViewPhase::Ready);
    assert!(view.errors().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_leaves_prior_state() {
    let api = FakeApi::with_images(&["a", "b"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();
    let generation = view.generation();

    api.set_images(&["x"]);
    api.fail("list_images");
    let err = view.refresh().await.unwrap_err();

    assert!(matches!(err, ViewError::Api(ApiError::Rejected { code: 500, .. })));
    assert_eq!(image_names(&view), vec!["a", "b"]);
    assert_eq!(view.phase(), ViewPhase::Ready);
    assert_eq!(view.generation(), generation);
    assert_eq!(view.errors().len(), 1);
    assert_eq!(view.errors().last().map(|e| e.action), Some("list images"));
}

#[tokio::test]
async fn test_failed_first_fetch_stays_unloaded() {
    let api = FakeApi::with_vms(&["web"]);
    api.fail("list_vms");
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());

    assert!(view.mount().await.is_err());
    assert!(view.is_mounted());
    assert!(view.vms().is_empty());
    assert_eq!(view.phase(), ViewPhase::Unmounted);

    api.recover("list_vms");
    view.refresh().await.unwrap();
    assert_eq!(vm_names(&view), vec!["web"]);
    assert_eq!(view.phase(), ViewPhase::Ready);
}

#[tokio::test]
async fn test_delete_selected_row_removes_that_entity() {
    let api = FakeApi::with_images(&["a", "b", "c"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    assert_eq!(view.select_for_delete(1).unwrap(), "b");
    let mutation = view.delete_selected().await.unwrap();

    assert_eq!(mutation.target, "b");
    assert!(!mutation.stale_selection);
    assert!(mutation.refreshed);
    assert_eq!(api.image_names(), vec!["a", "c"]);
    assert_eq!(image_names(&view), vec!["a", "c"]);
    assert_eq!(view.selected_for_delete(), None);
}

#[tokio::test]
async fn test_delete_without_selection_sends_nothing() {
    let api = FakeApi::with_vms(&["web"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    assert!(matches!(view.delete_selected().await, Err(ViewError::NothingSelected)));
    assert!(matches!(
        view.select_for_delete(3),
        Err(ViewError::IndexOutOfRange { index: 3, len: 1 })
    ));
    assert_eq!(api.calls_to("delete_vm"), 0);
}

#[tokio::test]
async fn test_selection_race_is_reported() {
    let api = FakeApi::with_images(&["a", "b", "c"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();
    view.select_for_delete(0).unwrap();

    // Another client adds an image before the delete is confirmed
    api.set_images(&["new", "a", "b", "c"]);
    view.refresh().await.unwrap();
    assert_eq!(image_names(&view)[0], "new");

    let mutation = view.delete_selected().await.unwrap();
    assert_eq!(mutation.target, "a");
    assert!(mutation.stale_selection);
    assert_eq!(api.image_names(), vec!["new", "b", "c"]);
}

#[tokio::test]
async fn test_selection_race_with_vanished_row_fails_visibly() {
    let api = FakeApi::with_vms(&["web", "db"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();
    view.select_for_delete(1).unwrap();

    api.set_vms(&["web"]);
    view.refresh().await.unwrap();

    let err = view.delete_selected().await.unwrap_err();
    assert!(matches!(err, ViewError::Api(ApiError::Rejected { .. })));
    assert_eq!(view.errors().last().map(|e| e.action), Some("delete VM"));
    assert_eq!(view.selected_for_delete(), Some("db"));
}

#[tokio::test]
async fn test_upload_into_empty_list_reloads() {
    let api = FakeApi::new();
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());

    assert_eq!(view.mount().await.unwrap(), 0);
    assert!(view.images().is_empty());
    assert!(view.errors().is_empty());
    assert_eq!(view.phase(), ViewPhase::Ready);

    view.form.name = "cirros".to_string();
    view.form.file_path = "/tmp/cirros.img".to_string();
    view.form.size = "1Gi".to_string();
    let mutation = view.upload().await.unwrap();

    assert!(mutation.refreshed);
    assert_eq!(mutation.receipt.message.as_deref(), Some("uploaded"));
    assert_eq!(image_names(&view), vec!["cirros"]);
    assert_eq!(view.images()[0].file_path, "/tmp/cirros.img");
    assert!(view.form.name.is_empty());
    assert_eq!(api.calls_to("list_images"), 2);
}

#[tokio::test]
async fn test_empty_form_is_forwarded_unvalidated() {
    let api = FakeApi::new();
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    view.create().await.unwrap();
    assert_eq!(api.calls_to("create_vm"), 1);
    assert_eq!(api.vm_names(), vec![""]);
}

#[tokio::test]
async fn test_failed_mutation_keeps_form_and_list() {
    let api = FakeApi::with_images(&["a"]);
    api.fail("upload_image");
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    view.form.name = "b".to_string();
    assert!(view.upload().await.is_err());

    assert_eq!(view.form.name, "b");
    assert_eq!(image_names(&view), vec!["a"]);
    assert_eq!(api.calls_to("list_images"), 1);
    assert_eq!(view.errors().last().map(|e| e.action), Some("upload image"));
}

#[tokio::test]
async fn test_failed_refetch_after_mutation_is_reported() {
    let api = FakeApi::with_images(&["a", "b"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();
    view.select_for_delete(0).unwrap();

    api.fail("list_images");
    let mutation = view.delete_selected().await.unwrap();

    assert!(!mutation.refreshed);
    assert_eq!(api.image_names(), vec!["b"]);
    assert_eq!(image_names(&view), vec!["a", "b"]);
    assert_eq!(view.selected_for_delete(), None);
    assert_eq!(view.errors().last().map(|e| e.action), Some("list images"));
}

#[tokio::test]
async fn test_create_and_delete_vm_reload_list() {
    let api = FakeApi::with_vms(&["web"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    view.form.name = "db".to_string();
    view.form.image = "fedora".to_string();
    view.form.size = 2;
    view.create().await.unwrap();
    assert_eq!(vm_names(&view), vec!["web", "db"]);
    assert_eq!(view.vms()[1].size, 2);
    assert_eq!(view.form, CreateVmForm::default());

    view.select_for_delete(0).unwrap();
    view.delete_selected().await.unwrap();
    assert_eq!(vm_names(&view), vec!["db"]);
}

#[tokio::test]
async fn test_start_and_stop_leave_list_stale() {
    let api = FakeApi::with_vms(&["web", "db"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    let mutation = view.start(0).await.unwrap();
    assert_eq!(mutation.target, "web");
    assert!(!mutation.refreshed);
    assert_eq!(api.calls_to("start_vm"), 1);
    assert!(api.calls().contains(&"start_vm web".to_string()));
    assert_eq!(api.calls_to("list_vms"), 1);

    assert_eq!(view.vms()[0].status_label(), Some("Not Ready"));
    assert_eq!(view.phase(), ViewPhase::Stale);

    view.stop(1).await.unwrap();
    assert_eq!(api.calls_to("stop_vm"), 1);
    assert_eq!(view.phase(), ViewPhase::Stale);

    view.refresh().await.unwrap();
    assert_eq!(view.phase(), ViewPhase::Ready);
    assert_eq!(view.vms()[0].status_label(), Some("Ready"));
}

#[tokio::test]
async fn test_power_action_on_missing_row() {
    let api = FakeApi::with_vms(&["web"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    assert!(matches!(
        view.stop(4).await,
        Err(ViewError::IndexOutOfRange { index: 4, len: 1 })
    ));
    assert_eq!(api.calls_to("stop_vm"), 0);
    assert_eq!(view.phase(), ViewPhase::Ready);
}

#[tokio::test]
async fn test_rename_refetches() {
    let api = FakeApi::with_images(&["old"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    let mutation = view.rename(0, "new").await.unwrap();
    assert_eq!(mutation.target, "old");
    assert_eq!(image_names(&view), vec!["new"]);
}

#[tokio::test]
async fn test_result_for_left_view_is_discarded() {
    let api = FakeApi::with_images(&["a"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());

    let ticket = view.activate();
    let pending = view.fetch_images();
    view.deactivate();

    let result = pending.await;
    assert!(matches!(view.apply_images(ticket, result), Err(ViewError::Detached)));
    assert!(view.images().is_empty());
    assert_eq!(view.phase(), ViewPhase::Unmounted);
    assert!(view.errors().is_empty());
}

#[tokio::test]
async fn test_result_from_earlier_mount_is_discarded() {
    let api = FakeApi::with_vms(&["web"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());

    let first = view.activate();
    let stale = view.fetch_vms();
    view.deactivate();
    let second = view.activate();
    let fresh = view.fetch_vms();

    api.set_vms(&["web", "db"]);
    let stale = stale.await;
    assert!(matches!(view.apply_vms(first, stale), Err(ViewError::Detached)));
    assert_eq!(view.phase(), ViewPhase::Loading);

    let fresh = fresh.await;
    view.apply_vms(second, fresh).unwrap();
    assert_eq!(view.phase(), ViewPhase::Ready);
}

#[tokio::test]
async fn test_list_fetched_before_delete_cannot_restore_deleted_row() {
    let api = FakeApi::with_images(&["a", "b"]);
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    let early = view.begin_refresh();
    let early_result = view.fetch_images().await;

    view.select_for_delete(0).unwrap();
    let mutation = view.delete_selected().await.unwrap();
    assert!(mutation.refreshed);
    assert_eq!(image_names(&view), vec!["b"]);

    assert!(matches!(
        view.apply_images(early, early_result),
        Err(ViewError::Superseded)
    ));
    assert_eq!(image_names(&view), vec!["b"]);
    assert_eq!(view.phase(), ViewPhase::Ready);
    assert!(view.errors().is_empty());
}

#[tokio::test]
async fn test_older_vm_list_is_dropped_when_answers_arrive_out_of_order() {
    let api = FakeApi::with_vms(&["web"]);
    let mut view = VmListView::new(api.clone(), RecordingNavigator::new());
    view.mount().await.unwrap();

    let first = view.begin_refresh();
    let first_result = view.fetch_vms().await;
    api.set_vms(&["web", "db"]);
    let second = view.begin_refresh();
    let second_result = view.fetch_vms().await;

    assert_eq!(view.apply_vms(second, second_result).unwrap(), 2);
    assert!(matches!(view.apply_vms(first, first_result), Err(ViewError::Superseded)));
    assert_eq!(vm_names(&view), vec!["web", "db"]);
}

#[tokio::test]
async fn test_mutation_on_unopened_view_does_not_start_loading() {
    let api = FakeApi::new();
    let mut view = ImageListView::new(api.clone(), RecordingNavigator::new());

    view.form.name = "cirros".to_string();
    let mutation = view.upload().await.unwrap();

    assert!(!mutation.refreshed);
    assert_eq!(api.image_names(), vec!["cirros"]);
    assert_eq!(view.phase(), ViewPhase::Unmounted);
    assert!(view.images().is_empty());
    assert!(!view.is_mounted());
}

#[tokio::test]
async fn test_overview_collections_load_independently() {
    let api = FakeApi::with_images(&["a", "b"]);
    api.set_vms(&["web"]);
    api.fail("list_vms");
    let mut view = OverviewView::new(api.clone(), RecordingNavigator::new());

    let load = view.mount().await;
    assert_eq!(load.images.as_ref().ok(), Some(&2));
    assert!(load.vms.is_err());
    assert!(!load.is_complete());

    let summary = view.summary();
    assert_eq!(summary.images, 2);
    assert_eq!(summary.vms, 0);
    assert_eq!(view.images_phase(), ViewPhase::Ready);
    assert_eq!(view.vms_phase(), ViewPhase::Unmounted);
    assert_eq!(view.errors().len(), 1);

    api.recover("list_vms");
    let load = view.refresh().await;
    assert!(load.is_complete());
    assert_eq!(view.summary().vms, 1);
    assert_eq!(view.summary().ready_vms, 0);
}

#[tokio::test]
async fn test_vm_detail_lists_attributes() {
    let api = FakeApi::with_vms(&["web"]);
    let mut view = VmDetailView::new(api.clone(), RecordingNavigator::new(), "web");

    view.mount().await.unwrap();
    assert_eq!(view.phase(), ViewPhase::Ready);

    let rows = view.attributes();
    assert_eq!(rows[0], ("Name".to_string(), "web".to_string()));
    assert!(rows.contains(&("Namespace".to_string(), "default".to_string())));
    assert!(rows.contains(&("Ready".to_string(), "Not Ready".to_string())));
}

#[tokio::test]
async fn test_vm_detail_for_unknown_name() {
    let api = FakeApi::new();
    let mut view = VmDetailView::new(api.clone(), RecordingNavigator::new(), "ghost");

    assert!(view.mount().await.is_err());
    assert!(view.vm().is_none());
    assert!(view.attributes().is_empty());
    assert_eq!(view.errors().last().map(|e| e.action), Some("get VM"));
}

#[tokio::test]
async fn test_views_announce_their_menu_option() {
    let api = FakeApi::new();
    let navigator = RecordingNavigator::new();

    ImageListView::new(api.clone(), navigator.clone()).mount().await.unwrap();
    VmListView::new(api.clone(), navigator.clone()).mount().await.unwrap();
    OverviewView::new(api.clone(), navigator.clone()).mount().await;
    let _ = VmDetailView::new(api.clone(), navigator.clone(), "web").mount().await;

    assert_eq!(
        navigator.seen(),
        vec![
            MenuOption::Images,
            MenuOption::VirtualMachines,
            MenuOption::Overview,
            MenuOption::VirtualMachines,
        ]
    );
}

#[tokio::test]
async fn test_shared_navigation_state_tracks_active_view() {
    let api = FakeApi::new();
    let navigation = Arc::new(NavigationState::new(MenuOption::Overview));
    let mut images = ImageListView::new(api.clone(), navigation.clone());

    images.mount().await.unwrap();
    assert_eq!(navigation.active(), MenuOption::Images);
    assert!(navigation.is_active(MenuOption::Images));

    let mut vms = VmListView::new(api.clone(), navigation.clone());
    vms.mount().await.unwrap();
    assert_eq!(navigation.active(), MenuOption::VirtualMachines);
}
