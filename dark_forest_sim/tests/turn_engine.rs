use bevy::ecs::event::{Event, Events};
use bevy::prelude::App;

use dark_forest_sim::{
    build_empty_app, build_ship, colonize_planet, detect_civilization, launch_attack,
    process_turn, research_technology, spawn_civilization, spawn_planet, spawn_ship,
    ActionError, ActionResolution, Civilization, CivilizationCharter, CivilizationId,
    CivilizationRegistry, CivilizationTraits, ControlType, Galaxy, GalaxyConfig, GridPosition,
    PlanetColonized, PlanetId, ResourceBundle, ResourceKind, ShipBuilt, ShipType, TaskCompleted,
    TaskCreated, TurnCounter, TurnEnded,
};

fn scenario() -> App {
    build_empty_app(GalaxyConfig::default()).expect("empty galaxy builds")
}

fn found(app: &mut App, name: &str, resources: ResourceBundle) -> CivilizationId {
    spawn_civilization(
        &mut app.world,
        CivilizationCharter::new(name, ControlType::Human)
            .with_resources(resources)
            .without_homeworld(),
    )
    .expect("civilization spawns")
}

fn settle(
    app: &mut App,
    owner: CivilizationId,
    position: GridPosition,
    yields: ResourceBundle,
) -> PlanetId {
    spawn_planet(&mut app.world, "Settled", yields, position, Some(owner)).expect("planet spawns")
}

fn civ(app: &App, id: CivilizationId) -> &Civilization {
    app.world
        .resource::<CivilizationRegistry>()
        .get(id)
        .expect("civilization registered")
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world.resource_mut::<Events<E>>().drain().collect()
}

#[test]
fn turn_counter_advances_once_per_process_turn() {
    let mut app = scenario();
    let a = found(&mut app, "A", ResourceBundle::default());
    let b = found(&mut app, "B", ResourceBundle::default());

    let mut ended = Vec::new();
    for expected in 1..=7u64 {
        let civilization = if expected % 2 == 0 { a } else { b };
        assert_eq!(process_turn(&mut app, civilization), Ok(expected));
        ended.extend(drain::<TurnEnded>(&mut app));
    }
    assert_eq!(app.world.resource::<TurnCounter>().0, 7);
    let turns: Vec<u64> = ended.iter().map(|event| event.turn).collect();
    assert_eq!(turns, (1..=7).collect::<Vec<_>>());
}

#[test]
fn gather_scales_post_gather_totals() {
    let mut app = scenario();
    let id = spawn_civilization(
        &mut app.world,
        CivilizationCharter::new("Miner", ControlType::Ai)
            .with_resources(ResourceBundle::new(100, 40, 5))
            .with_traits(CivilizationTraits {
                resource_gathering_rate: 1.5,
                ..CivilizationTraits::default()
            })
            .without_homeworld(),
    )
    .unwrap();
    settle(&mut app, id, GridPosition::new(1, 1), ResourceBundle::new(50, 20, 3));
    settle(&mut app, id, GridPosition::new(5, 5), ResourceBundle::new(30, 10, 0));

    process_turn(&mut app, id).unwrap();
    // (100 + 80) * 1.5, (40 + 30) * 1.5, intelligence unscaled
    assert_eq!(civ(&app, id).resources, ResourceBundle::new(270, 105, 8));

    process_turn(&mut app, id).unwrap();
    assert_eq!(civ(&app, id).resources.minerals, (270 + 80) * 3 / 2);
    assert_eq!(civ(&app, id).resources.intelligence, 11);
}

#[test]
fn compounding_gather_saturates_instead_of_overflowing() {
    let mut app = scenario();
    let id = spawn_civilization(
        &mut app.world,
        CivilizationCharter::new("Refiners", ControlType::Human)
            .with_resources(ResourceBundle::minerals(1000))
            .with_traits(CivilizationTraits {
                resource_gathering_rate: 1.05,
                ..CivilizationTraits::default()
            })
            .without_homeworld(),
    )
    .unwrap();
    settle(&mut app, id, GridPosition::new(3, 3), ResourceBundle::new(100, 80, 0));

    for turn in 1..=1000u64 {
        assert_eq!(process_turn(&mut app, id), Ok(turn));
    }
    let resources = civ(&app, id).resources;
    assert_eq!(resources.minerals, i64::MAX);
    assert_eq!(resources.energy, i64::MAX);
    assert_eq!(resources.intelligence, 0);
}

#[test]
fn research_pays_up_front_and_applies_once() {
    let mut app = scenario();
    let id = found(&mut app, "Scholars", ResourceBundle::intelligence(100));
    settle(&mut app, id, GridPosition::new(2, 2), ResourceBundle::default());

    let task = research_technology(&mut app.world, id, "Basic Spaceflight").unwrap();
    assert_eq!(civ(&app, id).resources.intelligence, 0);
    let created = drain::<TaskCreated>(&mut app);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].task, task);
    assert_eq!(created[0].turns, 2);

    process_turn(&mut app, id).unwrap();
    assert!(!civ(&app, id).has_researched("Basic Spaceflight"));
    assert!(drain::<TaskCompleted>(&mut app).is_empty());

    process_turn(&mut app, id).unwrap();
    assert!(civ(&app, id).has_researched("Basic Spaceflight"));
    assert_eq!(civ(&app, id).tech_level, 2);
    let completed = drain::<TaskCompleted>(&mut app);
    assert_eq!(completed.len(), 1);
    assert_eq!(
        completed[0].outcome,
        ActionResolution::Researched {
            technology: "Basic Spaceflight".to_string()
        }
    );

    for _ in 0..3 {
        process_turn(&mut app, id).unwrap();
    }
    assert_eq!(civ(&app, id).tech_level, 2);
    assert!(civ(&app, id).tasks.is_empty());
    assert!(drain::<TaskCompleted>(&mut app).is_empty());
}

#[test]
fn research_guards_against_repeats_and_missing_prerequisites() {
    let mut app = scenario();
    let id = found(&mut app, "Scholars", ResourceBundle::intelligence(1_000));

    assert!(matches!(
        research_technology(&mut app.world, id, "Dark Forest Doctrine"),
        Err(ActionError::MissingPrerequisites { .. })
    ));
    assert_eq!(
        research_technology(&mut app.world, id, "Warp Gates"),
        Err(ActionError::UnknownTechnology("Warp Gates".to_string()))
    );

    research_technology(&mut app.world, id, "Basic Spaceflight").unwrap();
    assert_eq!(
        research_technology(&mut app.world, id, "Basic Spaceflight"),
        Err(ActionError::ResearchInProgress("Basic Spaceflight".to_string()))
    );
    assert_eq!(civ(&app, id).resources.intelligence, 900);

    process_turn(&mut app, id).unwrap();
    process_turn(&mut app, id).unwrap();
    assert_eq!(
        research_technology(&mut app.world, id, "Basic Spaceflight"),
        Err(ActionError::TechnologyAlreadyResearched(
            "Basic Spaceflight".to_string()
        ))
    );
    let available: Vec<String> = civ(&app, id)
        .available_technologies()
        .into_iter()
        .map(|tech| tech.name.clone())
        .collect();
    assert!(available.contains(&"Subspace Sensors".to_string()));
    assert!(!available.contains(&"Dark Forest Doctrine".to_string()));
}

#[test]
fn built_ship_appears_at_first_planet_after_four_turns() {
    let mut app = scenario();
    let id = found(&mut app, "Shipwrights", ResourceBundle::minerals(300));
    settle(&mut app, id, GridPosition::new(3, 4), ResourceBundle::default());
    settle(&mut app, id, GridPosition::new(9, 9), ResourceBundle::default());

    let task = build_ship(&mut app.world, id, ShipType::Combat).unwrap();
    assert_eq!(civ(&app, id).resources.minerals, 100);
    assert_eq!(drain::<TaskCreated>(&mut app)[0].turns, 4);

    for _ in 0..3 {
        process_turn(&mut app, id).unwrap();
    }
    assert!(civ(&app, id).ships.is_empty());
    assert!(drain::<ShipBuilt>(&mut app).is_empty());

    process_turn(&mut app, id).unwrap();
    let ships = &civ(&app, id).ships;
    assert_eq!(ships.len(), 1);
    assert_eq!(ships[0].ship_type, ShipType::Combat);
    assert_eq!(ships[0].position, GridPosition::new(3, 4));
    let ship_id = ships[0].id;
    assert!(app
        .world
        .resource::<Galaxy>()
        .cell(GridPosition::new(3, 4))
        .unwrap()
        .ships
        .contains(&ship_id));

    let built = drain::<ShipBuilt>(&mut app);
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].ship, ship_id);
    let completed = drain::<TaskCompleted>(&mut app);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].task, task);
}

#[test]
fn colonization_takes_distance_over_two_turns() {
    let mut app = scenario();
    let id = found(&mut app, "Settlers", ResourceBundle::default());
    settle(&mut app, id, GridPosition::new(0, 0), ResourceBundle::default());
    let target = spawn_planet(
        &mut app.world,
        "Frontier",
        ResourceBundle::new(60, 40, 0),
        GridPosition::new(4, 0),
        None,
    )
    .unwrap();
    let ship = spawn_ship(&mut app.world, id, ShipType::Colonization, GridPosition::new(0, 0)).unwrap();

    colonize_planet(&mut app.world, id, target, ship).unwrap();
    assert_eq!(drain::<TaskCreated>(&mut app)[0].turns, 2);
    assert_eq!(
        colonize_planet(&mut app.world, id, target, ship),
        Err(ActionError::ShipAlreadyCommitted(ship))
    );

    process_turn(&mut app, id).unwrap();
    assert!(!app.world.resource::<Galaxy>().planet(target).unwrap().is_colonized());

    process_turn(&mut app, id).unwrap();
    let galaxy = app.world.resource::<Galaxy>();
    let planet = galaxy.planet(target).unwrap();
    assert!(planet.is_colonized());
    assert_eq!(planet.owner(), Some(id));
    assert!(galaxy.cell(GridPosition::new(0, 0)).unwrap().ships.is_empty());

    let settlers = civ(&app, id);
    assert!(settlers.planets.contains(&target));
    assert!(settlers.colonization_ships().is_empty());
    assert_eq!(settlers.visibility(), 15.0);

    let colonized = drain::<PlanetColonized>(&mut app);
    assert_eq!(colonized.len(), 1);
    assert_eq!(colonized[0].planet, target);
    assert_eq!(colonized[0].position, GridPosition::new(4, 0));
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let mut app = scenario();
    let poor = found(&mut app, "Poor", ResourceBundle::minerals(150));
    settle(&mut app, poor, GridPosition::new(1, 1), ResourceBundle::default());
    let homeless = found(&mut app, "Homeless", ResourceBundle::minerals(1_000));
    let rival = found(&mut app, "Rival", ResourceBundle::default());
    let scout = spawn_ship(&mut app.world, poor, ShipType::Exploration, GridPosition::new(1, 1)).unwrap();
    let claimed = spawn_planet(
        &mut app.world,
        "Claimed",
        ResourceBundle::default(),
        GridPosition::new(7, 7),
        Some(rival),
    )
    .unwrap();
    let colonizer = spawn_ship(&mut app.world, poor, ShipType::Colonization, GridPosition::new(1, 1)).unwrap();

    assert_eq!(
        build_ship(&mut app.world, poor, ShipType::Combat),
        Err(ActionError::InsufficientResources {
            resource: ResourceKind::Minerals,
            required: 200,
            available: 150,
        })
    );
    assert_eq!(
        build_ship(&mut app.world, CivilizationId(42), ShipType::Combat),
        Err(ActionError::UnknownCivilization(CivilizationId(42)))
    );
    assert!(matches!(
        colonize_planet(&mut app.world, poor, claimed, scout),
        Err(ActionError::WrongShipType { .. })
    ));
    assert_eq!(
        colonize_planet(&mut app.world, poor, claimed, colonizer),
        Err(ActionError::PlanetAlreadyColonized(claimed))
    );
    assert!(matches!(
        launch_attack(&mut app.world, poor, colonizer, GridPosition::new(2, 2)),
        Err(ActionError::WrongShipType { .. })
    ));

    assert_eq!(
        build_ship(&mut app.world, homeless, ShipType::Exploration),
        Err(ActionError::NoHomeworld)
    );

    assert_eq!(civ(&app, poor).resources, ResourceBundle::minerals(150));
    assert_eq!(civ(&app, homeless).resources, ResourceBundle::minerals(1_000));
    assert!(civ(&app, poor).tasks.is_empty());
    assert!(civ(&app, homeless).tasks.is_empty());
    assert!(drain::<TaskCreated>(&mut app).is_empty());
}

#[test]
fn attacks_complete_without_changing_the_galaxy() {
    let mut app = scenario();
    let id = found(&mut app, "Raiders", ResourceBundle::default());
    let ship = spawn_ship(&mut app.world, id, ShipType::Combat, GridPosition::new(0, 0)).unwrap();

    assert_eq!(
        launch_attack(&mut app.world, id, ship, GridPosition::new(20, 0)),
        Err(ActionError::TargetOutOfBounds(GridPosition::new(20, 0)))
    );
    launch_attack(&mut app.world, id, ship, GridPosition::new(10, 5)).unwrap();
    // distance 15 at weapon speed 5
    assert_eq!(drain::<TaskCreated>(&mut app)[0].turns, 3);

    for _ in 0..3 {
        process_turn(&mut app, id).unwrap();
    }
    let completed = drain::<TaskCompleted>(&mut app);
    assert_eq!(completed.len(), 1);
    assert!(matches!(
        completed[0].outcome,
        ActionResolution::AttackResolved { .. }
    ));
    assert_eq!(civ(&app, id).combat_ships().len(), 1);
    assert_eq!(civ(&app, id).combat_ships()[0].position, GridPosition::new(0, 0));
}

#[test]
fn detection_rate_converges_to_chance() {
    let mut app = scenario();
    let observer = found(&mut app, "Watcher", ResourceBundle::default());
    let target = found(&mut app, "Hidden", ResourceBundle::default());
    {
        let mut registry = app.world.resource_mut::<CivilizationRegistry>();
        let watcher = registry.get_mut(observer).unwrap();
        watcher.tech_level = 3;
        watcher.traits.stealth_bonus = 0.1;
        registry.get_mut(target).unwrap().raise_visibility(1.0);
    }

    // 11.0 - 3 * 0.5 + 0.1 = 9.6%
    let trials = 20_000;
    let mut hits = 0;
    for _ in 0..trials {
        if detect_civilization(&mut app.world, observer, target).unwrap() {
            hits += 1;
        }
    }
    let rate = hits as f64 / trials as f64;
    assert!((rate - 0.096).abs() < 0.01, "empirical rate {rate}");
}

#[test]
fn detection_saturates_outside_percent_range() {
    let mut app = scenario();
    let observer = found(&mut app, "Watcher", ResourceBundle::default());
    let loud = found(&mut app, "Loud", ResourceBundle::default());
    let silent = found(&mut app, "Silent", ResourceBundle::default());
    {
        let mut registry = app.world.resource_mut::<CivilizationRegistry>();
        registry.get_mut(loud).unwrap().raise_visibility(500.0);
        registry.get_mut(observer).unwrap().tech_level = 100;
    }
    // silent: 10 - 50 + 0.1 < 0; loud: 510 - 50 + 0.1 > 100
    for _ in 0..500 {
        assert!(!detect_civilization(&mut app.world, observer, silent).unwrap());
        assert!(detect_civilization(&mut app.world, observer, loud).unwrap());
    }
}
