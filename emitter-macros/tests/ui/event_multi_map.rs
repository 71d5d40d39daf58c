use emitter::{Event, EventEmitter, Listener, event, event_map};

#[event_map]
struct Source;

#[event_map]
struct Sink;

#[event(map = Source, map = Sink, name = "tick")]
enum Tick {
    Fast(u32),
    Slow,
}

#[event(map = Source)]
struct Wrapped<T: Clone + Send + Sync + 'static>(T);

fn main() {
    assert_eq!(<Tick as Event<Source>>::NAME, "tick");
    assert_eq!(<Tick as Event<Sink>>::NAME, "tick");
    assert_eq!(<Wrapped<u8> as Event<Source>>::NAME, "Wrapped");

    let source = EventEmitter::<Source>::new();
    let sink = EventEmitter::<Sink>::new();
    sink.on(Listener::new(|t: &Tick| {
        let _ = format!("{:?}", t);
    }));
    let _handle = source.pipe::<Tick, Sink>(&sink);
    source.emit(Tick::Fast(1)).unwrap();
    source.emit(Tick::Slow).unwrap();
    source.emit(Wrapped(3u8)).unwrap();
}
