use emitter::event_map;

#[event_map]
pub struct AppEvents;

#[event_map]
#[derive(Clone, PartialEq, Eq, Hash)]
struct OtherEvents;

fn assert_map<M: emitter::EventMap>() {}

fn main() {
    assert_map::<AppEvents>();
    assert_map::<OtherEvents>();

    // Debug/Copy/Default 由宏追加，已有的派生保留
    let a = AppEvents::default();
    let _b = a;
    let _ = format!("{:?}", a);
    assert!(OtherEvents == OtherEvents);
}
