use anyhow::Result as AnyResult;
use emitter::{EmitterConfig, EventEmitter, Listener, ListenerHandle, event, event_map};
use std::time::Duration;

#[event_map]
pub struct DbEvents;

#[event_map]
pub struct AuditEvents;

/// 连接建立（只会发生一次，迟到的订阅者直接拿到连接信息）
#[event(map = DbEvents, name = "db.connected")]
pub struct Connected {
    pub url: String,
}

/// 每次执行查询
#[event(map = DbEvents, map = AuditEvents, name = "db.query")]
pub struct Query {
    pub sql: String,
}

/// 关闭（同样封存到审计发射器上）
#[event(map = DbEvents, map = AuditEvents, name = "db.closed")]
pub struct Closed {
    pub queries: usize,
}

/// 以组合方式嵌入发射器的组件
struct Database {
    events: EventEmitter<DbEvents>,
    executed: usize,
}

impl Database {
    fn new() -> Self {
        let config = EmitterConfig::builder().label("database").build();
        Self {
            events: EventEmitter::with_config(config),
            executed: 0,
        }
    }

    fn events(&self) -> &EventEmitter<DbEvents> {
        &self.events
    }

    fn connect(&self, url: &str) -> AnyResult<()> {
        self.events.emit_once(Connected { url: url.to_string() })?;
        self.events.set_prepared(true);
        Ok(())
    }

    fn query(&mut self, sql: &str) -> AnyResult<()> {
        self.executed += 1;
        self.events.emit(Query { sql: sql.to_string() })?;
        Ok(())
    }

    fn close(&self) -> AnyResult<()> {
        self.events.emit_once(Closed {
            queries: self.executed,
        })?;
        Ok(())
    }
}

fn watch_queries(db: &Database) -> ListenerHandle {
    db.events().on(Listener::new(|q: &Query| {
        tracing::info!(sql = %q.sql, "query executed");
    }))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,emitter=debug")),
        )
        .init();

    let mut db = Database::new();
    let audit = EventEmitter::<AuditEvents>::with_config(
        EmitterConfig::builder().label("audit").build(),
    );

    audit.on(Listener::new(|q: &Query| {
        tracing::info!(sql = %q.sql, "audit: query recorded");
    }));
    let pipe = db.events().pipe::<Query, AuditEvents>(&audit);
    let closed = db.events().pipe_once::<Closed, AuditEvents>(&audit);

    // 就绪之前排队的工作
    let warmup = db.events().ready_with(|| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        tracing::info!("warmup finished");
        "warm"
    });

    let watcher = watch_queries(&db);
    db.connect("postgres://localhost/app")?;

    // 迟到的订阅者：立即回放连接信息
    db.events().on(Listener::new(|c: &Connected| {
        tracing::info!(url = %c.url, "late subscriber saw connection");
    }));

    let state = warmup.await?;
    tracing::info!(state, "database ready");

    db.query("select 1")?;
    pipe.stop();
    db.query("select 2")?;
    watcher.remove();

    if let Err(err) = db.connect("postgres://localhost/other") {
        tracing::warn!(error = %err, "second connect rejected");
    }

    db.close()?;
    closed.await?;
    if let Some(record) = audit.sealed::<Closed>() {
        tracing::info!(queries = record.queries, "audit sealed close record");
    }

    Ok(())
}
