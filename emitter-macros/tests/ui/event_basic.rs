use emitter::{Event, event, event_map};

#[event_map]
struct AppEvents;

#[event(map = AppEvents, name = "greet")]
struct Greet(String);

#[event(map = AppEvents)]
struct Boot {
    code: u32,
}

#[event(map = AppEvents, name = "shutdown")]
#[derive(PartialEq)]
struct Shutdown;

fn main() {
    assert_eq!(<Greet as Event<AppEvents>>::NAME, "greet");
    // 未指定 name 时取类型名
    assert_eq!(<Boot as Event<AppEvents>>::NAME, "Boot");
    assert_eq!(<Shutdown as Event<AppEvents>>::NAME, "shutdown");

    let g = Greet("Alice".into());
    let _ = format!("{:?}", g.clone());
    let b = Boot { code: 1 };
    assert_eq!(b.clone().code, 1);
    assert!(Shutdown == Shutdown.clone());
}
