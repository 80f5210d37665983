//! Scan engine behaviour over flat lists and composite keyboard-style rows.

use switchscan_core::{
    Activation, Highlight, Item, ItemRef, NavigableSet, RecordingFeedback, ScanEngine, ScanMode,
    ScreenProvider, SetUpdate,
};

/// Screen that records what the engine asked of it.
#[derive(Default)]
struct RecordingScreen {
    set: NavigableSet,
    activated: Vec<ItemRef>,
    backs: usize,
    refresh_on_activate: bool,
    exit_on_activate: bool,
}

impl RecordingScreen {
    fn new(set: NavigableSet) -> Self {
        Self {
            set,
            ..Default::default()
        }
    }
}

impl ScreenProvider for RecordingScreen {
    fn name(&self) -> &str {
        "recording"
    }

    fn navigable_set(&self) -> NavigableSet {
        self.set.clone()
    }

    fn activate(&mut self, target: ItemRef) -> Activation {
        self.activated.push(target);
        if self.exit_on_activate {
            Activation::Exit
        } else if self.refresh_on_activate {
            Activation::Refresh
        } else {
            Activation::Stay
        }
    }

    fn on_back(&mut self) -> Activation {
        self.backs += 1;
        Activation::Pop
    }
}

fn abc() -> NavigableSet {
    NavigableSet::new(vec![
        Item::new("a", "A"),
        Item::new("b", "B"),
        Item::new("c", "C"),
    ])
    .with_header(Item::new("back", "Back"))
}

fn keyboard() -> NavigableSet {
    let letters = |id: &str, labels: &[&str]| {
        Item::row(
            id,
            labels.join(" "),
            labels.iter().map(|l| Item::new(*l, *l)).collect(),
        )
    };
    NavigableSet::new(vec![
        Item::new("text", "Hello"),
        letters("row1", &["A", "B", "C"]),
        letters("row2", &["D", "E", "F"]),
        letters("predictions", &["YES", "NO", "HELP"]),
    ])
    .with_jump_target(3)
}

#[test]
fn forward_n_plus_one_times_closes_the_cycle() {
    for n in 1..8 {
        let items = (0..n).map(|i| Item::new(format!("{i}"), format!("{i}"))).collect();
        let set = NavigableSet::new(items).with_header(Item::new("back", "Back"));
        let mut fb = RecordingFeedback::new();
        let mut engine = ScanEngine::new(set);
        for _ in 0..=n {
            engine.scan_forward(&mut fb);
        }
        assert_eq!(engine.index(), -1, "n = {n}");
        assert_eq!(fb.last_highlight(), Some(&Highlight::Header));
    }
}

#[test]
fn forward_then_backward_is_identity() {
    let mut fb = RecordingFeedback::new();
    for start in 0..4 {
        let mut engine = ScanEngine::new(abc());
        for _ in 0..=start {
            engine.scan_forward(&mut fb);
        }
        let before = engine.index();
        engine.scan_forward(&mut fb);
        engine.scan_backward(&mut fb);
        assert_eq!(engine.index(), before);
    }
}

#[test]
fn select_on_header_calls_back_not_activate() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(abc());
    let mut engine = ScanEngine::new(screen.navigable_set());

    // Idle counts as the header slot too.
    let first = engine.select(&mut screen, &mut fb);
    assert!(matches!(first, Activation::Pop));

    for _ in 0..4 {
        engine.scan_forward(&mut fb);
    }
    assert_eq!(engine.index(), -1);
    engine.select(&mut screen, &mut fb);

    assert_eq!(screen.backs, 2);
    assert!(screen.activated.is_empty());
}

#[test]
fn forward_forward_back_select_activates_a_once() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(abc());
    let mut engine = ScanEngine::new(screen.navigable_set());

    engine.scan_forward(&mut fb);
    assert_eq!(engine.index(), 0);
    engine.scan_forward(&mut fb);
    assert_eq!(engine.index(), 1);
    engine.scan_backward(&mut fb);
    assert_eq!(engine.index(), 0);
    engine.select(&mut screen, &mut fb);

    assert_eq!(screen.activated, vec![ItemRef::item(0)]);
    assert_eq!(fb.spoken, vec!["A", "B", "A"]);
}

#[test]
fn each_step_cancels_speech_then_speaks_once() {
    let mut fb = RecordingFeedback::new();
    let mut engine = ScanEngine::new(abc());
    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    assert_eq!(fb.cancels, 2);
    assert_eq!(fb.spoken.len(), 2);
    assert_eq!(fb.last_highlight(), Some(&Highlight::Item { index: 1 }));
}

#[test]
fn composite_row_enters_item_mode_and_returns() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(keyboard());
    let mut engine = ScanEngine::new(screen.navigable_set());

    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    assert_eq!(engine.index(), 1);

    engine.select(&mut screen, &mut fb);
    assert_eq!(engine.mode(), ScanMode::Item);
    assert_eq!(fb.last_spoken(), Some("A"));
    assert!(screen.activated.is_empty());

    engine.scan_forward(&mut fb);
    assert_eq!(fb.last_spoken(), Some("B"));
    engine.select(&mut screen, &mut fb);

    assert_eq!(screen.activated, vec![ItemRef::child(1, 1)]);
    assert_eq!(engine.mode(), ScanMode::Row);
    assert_eq!(engine.index(), 1);
    assert_eq!(fb.last_spoken(), Some("A B C"));
}

#[test]
fn leaving_from_item_mode_does_not_reannounce_row() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(keyboard());
    screen.exit_on_activate = true;
    let mut engine = ScanEngine::new(screen.navigable_set());

    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    engine.select(&mut screen, &mut fb);
    assert_eq!(fb.last_spoken(), Some("A"));
    let spoken = fb.spoken.len();

    let activation = engine.select(&mut screen, &mut fb);
    assert!(matches!(activation, Activation::Exit));
    assert_eq!(fb.spoken.len(), spoken);
    assert_eq!(engine.mode(), ScanMode::Row);
}

#[test]
fn item_mode_wraps_within_row() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(keyboard());
    let mut engine = ScanEngine::new(screen.navigable_set());
    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    engine.select(&mut screen, &mut fb);

    engine.scan_backward(&mut fb);
    assert_eq!(fb.last_spoken(), Some("C"));
    engine.scan_forward(&mut fb);
    assert_eq!(fb.last_spoken(), Some("A"));
    assert_eq!(engine.index(), 1);
}

#[test]
fn leaf_row_in_composite_widget_activates_directly() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(keyboard());
    let mut engine = ScanEngine::new(screen.navigable_set());
    engine.scan_forward(&mut fb);
    engine.select(&mut screen, &mut fb);
    assert_eq!(screen.activated, vec![ItemRef::item(0)]);
    assert_eq!(engine.mode(), ScanMode::Row);
}

#[test]
fn long_press_toggles_jump_target_and_back() {
    let mut fb = RecordingFeedback::new();
    let mut engine = ScanEngine::new(keyboard());
    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    assert_eq!(engine.index(), 1);

    engine.long_press_select(&mut fb);
    assert_eq!(engine.index(), 3);
    assert_eq!(fb.last_spoken(), Some("YES NO HELP"));

    engine.long_press_select(&mut fb);
    assert_eq!(engine.index(), 1);
}

#[test]
fn long_press_from_item_mode_lands_in_row_mode() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(keyboard());
    let mut engine = ScanEngine::new(screen.navigable_set());
    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    engine.select(&mut screen, &mut fb);
    assert_eq!(engine.mode(), ScanMode::Item);

    engine.long_press_select(&mut fb);
    assert_eq!(engine.mode(), ScanMode::Row);
    assert_eq!(engine.index(), 3);
}

#[test]
fn long_press_without_jump_target_does_nothing() {
    let mut fb = RecordingFeedback::new();
    let mut engine = ScanEngine::new(abc());
    engine.scan_forward(&mut fb);
    engine.long_press_select(&mut fb);
    assert_eq!(engine.index(), 0);
    assert!(!engine.has_long_press());
}

#[test]
fn refresh_activation_keeps_position() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(abc());
    screen.refresh_on_activate = true;
    let mut engine = ScanEngine::new(screen.navigable_set());
    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);

    screen.set = NavigableSet::new(vec![
        Item::new("a", "A2"),
        Item::new("b", "B2"),
        Item::new("c", "C2"),
        Item::new("d", "D2"),
    ])
    .with_header(Item::new("back", "Back"));
    engine.select(&mut screen, &mut fb);

    assert_eq!(engine.index(), 1);
    assert_eq!(engine.set().len(), 4);
    assert!(!engine.is_idle());
}

#[test]
fn retain_skips_to_next_visible_when_current_disappears() {
    let mut fb = RecordingFeedback::new();
    let mut engine = ScanEngine::new(abc());
    engine.scan_forward(&mut fb);
    engine.scan_forward(&mut fb);
    let set = NavigableSet::new(vec![
        Item::new("a", "A"),
        Item::new("b", "B").hidden(),
        Item::new("c", "C"),
    ])
    .with_header(Item::new("back", "Back"));
    engine.replace_set(set, SetUpdate::Retain, &mut fb);
    assert_eq!(engine.index(), 2);
}

#[test]
fn select_on_empty_set_is_a_no_op() {
    let mut fb = RecordingFeedback::new();
    let mut screen = RecordingScreen::new(NavigableSet::default());
    let mut engine = ScanEngine::new(NavigableSet::default());
    let activation = engine.select(&mut screen, &mut fb);
    assert!(matches!(activation, Activation::Stay));
    assert_eq!(screen.backs, 0);
}
