use super::*;

#[test]
fn toasts_arrive_in_order() {
    let (notifier, mut rx) = Notifier::channel();
    notifier.info("Nothing to undo");
    notifier.error("Save failed");
    notifier.success("Saved");

    let levels: Vec<ToastLevel> = std::iter::from_fn(|| rx.try_recv().ok()).map(|t| t.level).collect();
    assert_eq!(levels, vec![ToastLevel::Info, ToastLevel::Error, ToastLevel::Success]);
}

#[test]
fn dropped_receiver_is_not_fatal() {
    let (notifier, rx) = Notifier::channel();
    drop(rx);
    notifier.error("nobody listening");
}

#[test]
fn display_tags_level() {
    let toast = Toast { level: ToastLevel::Error, message: "Document failed to load".into() };
    assert_eq!(toast.to_string(), "[error] Document failed to load");
}
