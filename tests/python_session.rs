use std::time::Duration;

use anyhow::Result;
use pyrun::bootstrap::{Bootstrapper, CorePolicy, PackageList, Ready};
use pyrun::execution::ExecutionSession;
use pyrun::process::python::{resolve_interpreter, PythonEngine, PythonLoader};

/// Bootstrap a real interpreter, or `None` when no Python is on PATH.
async fn ready(packages: PackageList, policy: CorePolicy) -> Option<Ready<PythonEngine>> {
    if resolve_interpreter(None).is_err() {
        println!("python not found in PATH, skipping");
        return None;
    }
    let (boot, _progress) = Bootstrapper::new(packages, policy);
    Some(boot.run(PythonLoader::new(None)).await.expect("bootstrap"))
}

/// Run a failing snippet, then check the session still captures a fresh run.
async fn fails_then_recovers(session: &ExecutionSession<PythonEngine>, code: &str) -> String {
    let shown = session.run_display(code).await;
    assert!(shown.starts_with("Error: "), "{code:?} gave {shown:?}");
    let next = session.run("print('after')").await.expect("session survives");
    assert_eq!(next.stdout, "after\n");
    shown
}

#[tokio::test]
async fn expression_value_is_returned() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let result = ready.session.run("1+1").await?;
    assert_eq!(result.return_value.as_deref(), Some("2"));
    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn print_is_captured_without_value() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let result = ready.session.run("print('hi')").await?;
    assert_eq!(result.stdout, "hi\n");
    assert!(result.return_value.is_none());
    assert_eq!(result.to_string(), "Output:\nhi\n\n");
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn raise_reports_message_and_keeps_runtime_usable() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let shown = ready.session.run_display("print('partial')\nraise ValueError('bad')").await;
    assert_eq!(shown, "Error: bad");

    // Streams were restored: the next run captures its own output only.
    let next = ready.session.run("print('after')").await?;
    assert_eq!(next.stdout, "after\n");
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn runs_do_not_leak_into_each_other() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    ready.session.run("print('X')").await?;
    let second = ready.session.run("print('Y')").await?;
    assert_eq!(second.stdout, "Y\n");
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn namespace_persists_and_stderr_is_separate() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    ready.session.run("x = 20").await?;
    let result = ready
        .session
        .run("import sys\nprint('warn', file=sys.stderr)\nx + 1")
        .await?;
    assert_eq!(result.stderr, "warn\n");
    assert!(result.stdout.is_empty());
    assert_eq!(result.return_value.as_deref(), Some("21"));

    let silent = ready.session.run("x;").await?;
    assert!(silent.return_value.is_none());
    let none = ready.session.run("None").await?;
    assert_eq!(none.to_string(), "Code executed successfully (no output)");
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn top_level_await_is_supported() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let result = ready
        .session
        .run("import asyncio\nawait asyncio.sleep(0)\nawait asyncio.sleep(0, result='done')")
        .await?;
    assert_eq!(result.return_value.as_deref(), Some("done"));
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn stdlib_core_packages_load() -> Result<()> {
    let packages = PackageList {
        core: vec!["json".into(), "math".into()],
        best_effort: Vec::new(),
        verify: Some("json".into()),
    };
    let Some(ready) = ready(packages, CorePolicy::Strict).await else {
        return Ok(());
    };
    assert!(ready.warning.is_none());
    let result = ready.session.run("import math\nmath.floor(2.5)").await?;
    assert_eq!(result.return_value.as_deref(), Some("2"));
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn missing_core_package_is_fatal_when_strict() {
    if resolve_interpreter(None).is_err() {
        println!("python not found in PATH, skipping");
        return;
    }
    let packages = PackageList {
        core: vec!["definitely_not_a_module_1234".into()],
        ..PackageList::default()
    };
    let (boot, progress) = Bootstrapper::new(packages, CorePolicy::Strict);
    assert!(boot.run(PythonLoader::new(None)).await.is_err());
    assert!(progress.borrow().status.starts_with("Error: could not load"));
    assert!(progress.borrow().percent < 100);
}

#[tokio::test]
async fn keyboard_interrupt_keeps_worker_alive() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let shown = fails_then_recovers(&ready.session, "raise KeyboardInterrupt('stop')").await;
    assert_eq!(shown, "Error: stop");
    let bare = fails_then_recovers(&ready.session, "raise KeyboardInterrupt").await;
    assert_eq!(bare, "Error: KeyboardInterrupt");
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn exit_is_reported_not_obeyed() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    assert_eq!(fails_then_recovers(&ready.session, "exit()").await, "Error: SystemExit");
    assert_eq!(
        fails_then_recovers(&ready.session, "import sys\nsys.exit(3)").await,
        "Error: SystemExit: 3"
    );
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn syntax_error_is_displayed() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let shown = fails_then_recovers(&ready.session, "def f(:\n    pass").await;
    assert!(shown.contains("line 1"), "{shown}");
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn input_hits_end_of_file() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let shown = fails_then_recovers(&ready.session, "input('name? ')").await;
    assert_eq!(shown, "Error: EOF when reading a line");
    // stdin stays empty after exit() closed it
    fails_then_recovers(&ready.session, "exit()").await;
    assert_eq!(
        ready.session.run_display("input()").await,
        "Error: EOF when reading a line"
    );
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn semicolon_in_trailing_comment_keeps_value() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let kept = ready.session.run("x = 3\nx  # keep;").await?;
    assert_eq!(kept.return_value.as_deref(), Some("3"));
    let dropped = ready.session.run("x;  # silent").await?;
    assert!(dropped.return_value.is_none());
    let in_string = ready.session.run("'a;'").await?;
    assert_eq!(in_string.return_value.as_deref(), Some("a;"));
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn snippets_run_in_real_main_module() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let result = ready
        .session
        .run("import pickle\nclass P: pass\ntype(pickle.loads(pickle.dumps(P()))) is P")
        .await?;
    assert_eq!(result.return_value.as_deref(), Some("True"));

    let result = ready
        .session
        .run("import __main__\n__main__.P is P and not hasattr(__main__, '_proto')")
        .await?;
    assert_eq!(result.return_value.as_deref(), Some("True"));
    ready.session.into_engine().shutdown().await;
    Ok(())
}

#[tokio::test]
async fn abandoned_run_does_not_desync_later_runs() -> Result<()> {
    let Some(ready) = ready(PackageList::default(), CorePolicy::Strict).await else {
        return Ok(());
    };
    let slow = tokio::time::timeout(
        Duration::from_millis(100),
        ready.session.run("import time\ntime.sleep(0.5)\n'slow'"),
    )
    .await;
    assert!(slow.is_err());

    let a = ready.session.run("print('A')").await?;
    assert_eq!(a.stdout, "A\n");
    assert!(a.return_value.is_none());
    let b = ready.session.run("print('B')\n'b'").await?;
    assert_eq!(b.stdout, "B\n");
    assert_eq!(b.return_value.as_deref(), Some("b"));
    ready.session.into_engine().shutdown().await;
    Ok(())
}
