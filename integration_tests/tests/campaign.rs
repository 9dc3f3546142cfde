mod common;

use anyhow::{anyhow, Context};
use bevy::prelude::App;
use crossbeam_channel::Receiver;
use dark_forest_sim::queries::{available_technologies, colonization_ships, uncolonized_planets};
use dark_forest_sim::{
    attach_notification_feed, break_alliance, build_headless_app, build_ship, colonize_planet,
    declare_war, diplomacy_status, form_alliance, research_technology, run_round, send_message,
    CivilizationId, CivilizationRegistry, DiplomacyStatus, Notification, ShipType,
};

fn collect(receiver: &Receiver<Notification>, sink: &mut Vec<Notification>) {
    sink.extend(receiver.try_iter());
}

fn visibility(app: &App, id: CivilizationId) -> f64 {
    app.world
        .resource::<CivilizationRegistry>()
        .get(id)
        .map(|civ| civ.visibility())
        .unwrap_or_default()
}

#[test]
fn opening_moves_flow_through_the_notification_feed() -> anyhow::Result<()> {
    common::ensure_test_config();
    let mut app = build_headless_app()?;
    let receiver = attach_notification_feed(&mut app);
    let player = app.world.resource::<CivilizationRegistry>().ids()[0];

    let offered: Vec<String> = available_technologies(&app.world, player)
        .into_iter()
        .map(|tech| tech.name)
        .collect();
    assert_eq!(offered, vec!["Basic Spaceflight".to_string()]);

    research_technology(&mut app.world, player, "Basic Spaceflight")?;
    let build = build_ship(&mut app.world, player, ShipType::Colonization)?;

    let mut seen = Vec::new();
    let mut ship = None;
    for _ in 0..10 {
        run_round(&mut app)?;
        collect(&receiver, &mut seen);
        if let Some(found) = colonization_ships(&app.world, player).first() {
            ship = Some(found.clone());
            break;
        }
    }
    let ship = ship.context("colonization ship was never built")?;

    let built_at = seen
        .iter()
        .position(|n| matches!(n, Notification::ShipBuilt { ship: id, .. } if *id == ship.id))
        .ok_or_else(|| anyhow!("missing ship built notification"))?;
    let completed_at = seen
        .iter()
        .position(|n| matches!(n, Notification::TaskCompleted { task, .. } if *task == build))
        .ok_or_else(|| anyhow!("missing task completed notification"))?;
    assert!(built_at < completed_at);
    assert_eq!(
        seen.iter()
            .filter(|n| matches!(n, Notification::TaskCreated { civilization, .. } if *civilization == player))
            .count(),
        2
    );

    let target = uncolonized_planets(&app.world)
        .into_iter()
        .min_by_key(|planet| (ship.position.manhattan_distance(planet.position()), planet.id()))
        .context("fixture galaxy has free planets")?;
    let before = visibility(&app, player);
    colonize_planet(&mut app.world, player, target.id(), ship.id)?;

    let mut colonized = false;
    for _ in 0..30 {
        run_round(&mut app)?;
        collect(&receiver, &mut seen);
        if seen.iter().any(|n| {
            matches!(n, Notification::PlanetColonized { planet, civilization, .. }
                if *planet == target.id() && *civilization == player)
        }) {
            colonized = true;
            break;
        }
    }
    assert!(colonized, "planet {} never colonized", target.id());
    assert_eq!(visibility(&app, player) - before, 5.0);
    assert!(colonization_ships(&app.world, player).is_empty());

    let turns_ended = seen
        .iter()
        .filter(|n| matches!(n, Notification::TurnEnded { .. }))
        .count();
    assert_eq!(turns_ended as u64, app.world.resource::<dark_forest_sim::TurnCounter>().0);
    Ok(())
}

#[test]
fn diplomacy_stays_symmetric_across_every_pair() -> anyhow::Result<()> {
    common::ensure_test_config();
    let mut app = build_headless_app()?;
    let ids = app.world.resource::<CivilizationRegistry>().ids();

    for (index, a) in ids.iter().enumerate() {
        for b in &ids[index + 1..] {
            form_alliance(&mut app.world, *a, *b)?;
            assert_eq!(diplomacy_status(&app.world, *a, *b), DiplomacyStatus::Allied);
            assert_eq!(diplomacy_status(&app.world, *b, *a), DiplomacyStatus::Allied);
        }
    }

    declare_war(&mut app.world, ids[2], ids[0])?;
    assert_eq!(diplomacy_status(&app.world, ids[0], ids[2]), DiplomacyStatus::AtWar);
    assert_eq!(diplomacy_status(&app.world, ids[1], ids[2]), DiplomacyStatus::Allied);

    for (index, a) in ids.iter().enumerate() {
        for b in &ids[index + 1..] {
            break_alliance(&mut app.world, *b, *a)?;
            assert_eq!(diplomacy_status(&app.world, *a, *b), DiplomacyStatus::Neutral);
            assert_eq!(diplomacy_status(&app.world, *b, *a), DiplomacyStatus::Neutral);
        }
    }

    let before = visibility(&app, ids[1]);
    send_message(&mut app.world, ids[1], ids[2])?;
    assert_eq!(visibility(&app, ids[1]) - before, 2.0);
    Ok(())
}
