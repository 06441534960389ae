//! End-to-end screen scenarios on a simulated clock.

use std::time::Duration;

use obsidian_fx::scramble::{SCRAMBLE_INTERVAL, TextScrambler, scramble_frames};
use obsidian_fx::screens::landing::LandingScreen;
use obsidian_fx::screens::{
    AccessScreen, AuthField, DashboardScreen, Screen, ScreenContext, ScreenId, ScreenInput,
};
use obsidian_fx::stage::VisualState;
use obsidian_fx::telemetry::SimulatedClock;
use obsidian_fx::{ScreenConfig, Shell};
use obsidian_runtime::Scheduler;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const DT: Duration = Duration::from_millis(16);

fn config() -> ScreenConfig {
    ScreenConfig::default().with_seed(2024)
}

fn clock() -> SimulatedClock {
    SimulatedClock::from_unix(1_700_000_000)
}

fn frames(host: &mut Scheduler, screen: &mut dyn Screen, n: usize, dt: Duration) {
    let clock = clock();
    for _ in 0..n {
        for fired in host.advance(dt) {
            let mut cx = ScreenContext {
                host: &mut *host,
                clock: &clock,
            };
            screen.handle(&fired, &mut cx);
        }
    }
}

#[test]
fn landing_rotates_then_freezes_after_unmount() {
    let mut host = Scheduler::new();
    let clock = clock();
    let mut landing = {
        let mut cx = ScreenContext {
            host: &mut host,
            clock: &clock,
        };
        LandingScreen::mount(&config(), &mut cx)
    };

    assert_eq!(landing.nodes().len(), 3000);
    assert!(landing.nodes().points().iter().all(|p| p.abs().max_element() <= 7.5));

    frames(&mut host, &mut landing, 100, DT);
    let r = landing.nodes().rotation();
    let secs = 100.0 * DT.as_secs_f64();
    assert!((r.x - secs / 15.0).abs() < 1e-9, "x = {}", r.x);
    assert!((r.y - secs / 20.0).abs() < 1e-9, "y = {}", r.y);

    landing.unmount();
    let frozen = landing.nodes().rotation();
    frames(&mut host, &mut landing, 100, DT);
    assert_eq!(landing.nodes().rotation(), frozen);
    assert_eq!(host.live_tasks(), 0);
    assert_eq!(landing.live_tasks(), 0);
}

#[test]
fn reveal_stops_mutating_after_unmount() {
    let mut host = Scheduler::new();
    let clock = clock();
    let mut landing = {
        let mut cx = ScreenContext {
            host: &mut host,
            clock: &clock,
        };
        LandingScreen::mount(&config(), &mut cx)
    };
    frames(&mut host, &mut landing, 20, DT);
    assert!(landing.reveal().is_running());

    landing.unmount();
    let snapshot: Vec<VisualState> = landing.stage().elements().iter().map(|e| e.state()).collect();
    frames(&mut host, &mut landing, 300, DT);
    let later: Vec<VisualState> = landing.stage().elements().iter().map(|e| e.state()).collect();
    assert_eq!(snapshot, later);
    assert!(!landing.reveal().is_finished());
}

#[test]
fn landing_reveal_completes_once() {
    let mut host = Scheduler::new();
    let clock = clock();
    let mut landing = {
        let mut cx = ScreenContext {
            host: &mut host,
            clock: &clock,
        };
        LandingScreen::mount(&config(), &mut cx)
    };
    frames(&mut host, &mut landing, 200, DT);
    assert!(landing.reveal().is_finished());
    assert!(!landing.reveal().is_running());
    assert!(landing.stage().elements().iter().all(|e| e.state() == VisualState::REST));
    // motion and the clock keep going
    assert_eq!(landing.live_tasks(), 2);
}

#[test]
fn scrambler_converges_on_obsidian() {
    let mut host = Scheduler::new();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut s = TextScrambler::start("OBSIDIAN", &mut host, &mut rng);
    let mut previous_fixed = 0;
    let mut ticks = 0;
    while !s.is_done() {
        for fired in host.advance(SCRAMBLE_INTERVAL) {
            s.handle(&fired, &mut rng);
        }
        assert!(s.fixed() >= previous_fixed);
        previous_fixed = s.fixed();
        ticks += 1;
        assert!(ticks <= 24);
    }
    assert_eq!(s.text(), "OBSIDIAN");
    for _ in 0..10 {
        for fired in host.advance(SCRAMBLE_INTERVAL) {
            s.handle(&fired, &mut rng);
        }
    }
    assert_eq!(s.text(), "OBSIDIAN");
    assert_eq!(host.live_tasks(), 0);
}

#[test]
fn empty_scramble_emits_nothing_but_empty() {
    let mut rng = SmallRng::seed_from_u64(1);
    assert_eq!(scramble_frames("", &mut rng).collect::<Vec<_>>(), vec![String::new()]);
}

fn submit_credentials(shell: &mut Shell, host: &mut Scheduler) {
    shell.input(ScreenInput::Field(AuthField::Id, "operator-7".into()), host);
    shell.input(ScreenInput::Field(AuthField::Key, "k3y".into()), host);
    shell.input(ScreenInput::Submit, host);
}

#[test]
fn access_redirects_after_delay() {
    let mut host = Scheduler::new();
    let mut shell = Shell::new(config(), clock());
    shell.open("/access", &mut host).unwrap();
    submit_credentials(&mut shell, &mut host);

    for _ in 0..23 {
        shell.frame(&mut host, Duration::from_millis(100));
    }
    assert_eq!(shell.current_id(), Some(ScreenId::Access));
    shell.frame(&mut host, Duration::from_millis(100));
    assert_eq!(shell.current_id(), Some(ScreenId::Dashboard));
    assert_eq!(shell.history(), &[ScreenId::Access, ScreenId::Dashboard]);
}

#[test]
fn leaving_access_cancels_redirect() {
    let mut host = Scheduler::new();
    let mut shell = Shell::new(config(), clock());
    shell.open("/acces", &mut host).unwrap();
    submit_credentials(&mut shell, &mut host);
    for _ in 0..10 {
        shell.frame(&mut host, Duration::from_millis(100));
    }
    shell.open("/", &mut host).unwrap();
    for _ in 0..50 {
        shell.frame(&mut host, Duration::from_millis(100));
    }
    assert_eq!(shell.current_id(), Some(ScreenId::Landing));
    assert!(!shell.history().contains(&ScreenId::Dashboard));
}

#[test]
fn dashboard_latency_stays_bounded() {
    let mut host = Scheduler::new();
    let mut shell = Shell::new(config(), clock());
    shell.navigate(ScreenId::Dashboard, &mut host);
    for _ in 0..600 {
        shell.frame(&mut host, Duration::from_millis(250));
        let ping = shell
            .current()
            .and_then(|s| s.readouts().into_iter().find(|r| r.label == "ping"))
            .map(|r| r.value)
            .unwrap();
        let ms: f32 = ping
            .trim_start_matches("Ping: ")
            .trim_end_matches("ms")
            .parse()
            .unwrap();
        assert!((18.0..=42.0).contains(&ms), "{ping}");
    }
}

/// After the owner is gone nothing may tick, now or later.
fn assert_quiet(host: &mut Scheduler) {
    assert_eq!(host.live_tasks(), 0);
    for _ in 0..50 {
        assert_eq!(host.advance(Duration::from_millis(100)).count(), 0);
    }
}

#[test]
fn dropping_landing_revokes_its_tasks() {
    let mut host = Scheduler::new();
    let clock = clock();
    let mut landing = {
        let mut cx = ScreenContext {
            host: &mut host,
            clock: &clock,
        };
        LandingScreen::mount(&config(), &mut cx)
    };
    frames(&mut host, &mut landing, 10, DT);
    assert!(host.live_tasks() > 0);

    drop(landing);
    assert_quiet(&mut host);
}

#[test]
fn dropping_access_mid_auth_revokes_redirect() {
    let mut host = Scheduler::new();
    let clock = clock();
    let mut access = {
        let mut cx = ScreenContext {
            host: &mut host,
            clock: &clock,
        };
        let mut access = AccessScreen::mount(&config(), &mut cx);
        access.set_field(AuthField::Id, "operator-7");
        access.set_field(AuthField::Key, "k3y");
        access.input(ScreenInput::Submit, &mut cx);
        access
    };
    frames(&mut host, &mut access, 10, DT);
    assert!(access.live_tasks() > 0);

    drop(access);
    assert_quiet(&mut host);
}

#[test]
fn dropping_dashboard_revokes_its_tasks() {
    let mut host = Scheduler::new();
    let clock = clock();
    let mut dashboard = {
        let mut cx = ScreenContext {
            host: &mut host,
            clock: &clock,
        };
        DashboardScreen::mount(&config(), &mut cx)
    };
    frames(&mut host, &mut dashboard, 10, Duration::from_millis(250));
    assert!(host.live_tasks() > 0);

    drop(dashboard);
    assert_quiet(&mut host);
}

#[test]
fn dropping_shell_revokes_mounted_screen() {
    for id in [ScreenId::Landing, ScreenId::Access, ScreenId::Dashboard] {
        let mut host = Scheduler::new();
        let mut shell = Shell::new(config(), clock());
        shell.navigate(id, &mut host);
        for _ in 0..5 {
            shell.frame(&mut host, DT);
        }
        assert!(host.live_tasks() > 0, "{id:?}");

        drop(shell);
        assert_quiet(&mut host);
    }
}
