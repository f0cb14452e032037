//! Score tables and visibility maps for dashboards.
//!
//! A snapshot of one game type first captures every binding of that type
//! (name, game id, score, hero state) into a point-in-time list, then builds
//! both tables from that list alone. Hero state is read once per binding.
//!
//! Visibility: an ungrouped player sees only itself. A player on a shared
//! board sees every member of the board's group, resolved from the sibling
//! [`GameId`]s the game reports back to bindings of the same type. A sibling
//! that no longer resolves (a stale or removed instance) is dropped and
//! logged; it never fails the snapshot.

use std::collections::BTreeMap;

use arena_types::{GameData, GameId, HeroData, HeroesMap, ScoreTable};
use serde_json::Value;
use tracing::warn;

use crate::registry::PlayerGameRegistry;

/// One binding as seen at snapshot time.
struct Captured {
    name: String,
    game: GameId,
    score: i64,
    hero: HeroData,
}

/// Build the snapshot for `game_type`, or `None` if no player is bound to
/// a type of that name.
pub fn snapshot(registry: &PlayerGameRegistry, game_type: &str) -> Option<GameData> {
    let bindings = registry.bindings_of_type(game_type);
    let descriptor = std::sync::Arc::clone(bindings.first()?.player().game_type());

    let captured: Vec<Captured> = bindings
        .iter()
        .map(|binding| Captured {
            name: binding.player().name().to_owned(),
            game: binding.game().id(),
            score: binding.player().score(),
            hero: binding.game().hero(),
        })
        .collect();

    Some(GameData {
        board_size: descriptor.board_size(),
        decoder: descriptor.decoder(),
        scores: score_table(&captured),
        heroes: visibility_map(game_type, &captured),
    })
}

/// Snapshots of every game type currently in play, keyed by type name.
pub fn snapshots(registry: &PlayerGameRegistry) -> BTreeMap<String, GameData> {
    registry
        .game_types()
        .iter()
        .filter_map(|game_type| {
            let name = game_type.name().to_owned();
            snapshot(registry, &name).map(|data| (name, data))
        })
        .collect()
}

fn score_table(captured: &[Captured]) -> ScoreTable {
    captured
        .iter()
        .map(|entry| (entry.name.clone(), entry.score))
        .collect()
}

fn visibility_map(game_type: &str, captured: &[Captured]) -> HeroesMap {
    let owners: BTreeMap<GameId, &str> = captured
        .iter()
        .map(|entry| (entry.game, entry.name.as_str()))
        .collect();
    let states: BTreeMap<&str, &Value> = captured
        .iter()
        .map(|entry| (entry.name.as_str(), &entry.hero.state))
        .collect();

    let mut heroes = HeroesMap::new();
    for entry in captured {
        let visible: Vec<&str> = match entry.hero.players_group() {
            None => vec![entry.name.as_str()],
            Some(group) => group
                .iter()
                .filter_map(|sibling| {
                    let owner = owners.get(sibling).copied();
                    if owner.is_none() {
                        warn!(
                            game_type,
                            player = %entry.name,
                            sibling = %sibling,
                            "Shared-board sibling has no live binding, skipped"
                        );
                    }
                    owner
                })
                .collect(),
        };

        let peers: BTreeMap<String, Value> = visible
            .into_iter()
            .filter_map(|peer| {
                states
                    .get(peer)
                    .map(|state| (peer.to_owned(), (*state).clone()))
            })
            .collect();
        heroes.insert(entry.name.clone(), peers);
    }
    heroes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::statistics::ActivityStatistics;
    use crate::testing::{CountingGame, CountingType, GameProbe, player, scored_player};

    fn registry() -> PlayerGameRegistry {
        PlayerGameRegistry::new(Arc::new(ActivityStatistics::new()))
    }

    fn keys<V>(map: &BTreeMap<String, V>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn unknown_type_has_no_snapshot() {
        assert!(snapshot(&registry(), "snake").is_none());
    }

    #[test]
    fn scores_cover_exactly_bound_players_of_type() {
        let snake = CountingType::single("snake");
        let board = CountingType::shared("board");
        let mut reg = registry();
        reg.add(scored_player("s1", 10, &snake), Box::new(CountingGame::new()));
        reg.add(scored_player("b1", 99, &board), Box::new(CountingGame::new()));
        reg.add(scored_player("s2", 20, &snake), Box::new(CountingGame::new()));

        let data = snapshot(&reg, "snake").unwrap();
        assert_eq!(keys(&data.scores), vec!["s1", "s2"]);
        assert_eq!(data.scores.get("s2"), Some(&20));
        assert_eq!(data.board_size, 15);
        assert_eq!(data.decoder, serde_json::json!({ "plots": ["none", "hero"] }));
    }

    #[test]
    fn ungrouped_player_sees_only_itself() {
        let snake = CountingType::single("snake");
        let mut reg = registry();
        reg.add(player("s1", &snake), Box::new(CountingGame::new()));
        reg.add(player("s2", &snake), Box::new(CountingGame::new()));

        let data = snapshot(&reg, "snake").unwrap();
        assert_eq!(keys(data.heroes.get("s1").unwrap()), vec!["s1"]);
        assert_eq!(keys(data.heroes.get("s2").unwrap()), vec!["s2"]);
    }

    #[test]
    fn shared_group_sees_every_member() {
        let board = CountingType::shared("board");
        let probe = Arc::new(GameProbe::default());
        let games: Vec<CountingGame> = (0..3)
            .map(|_| CountingGame::on_board(Arc::clone(&probe)))
            .collect();
        probe.set_group(games.iter().map(crate::game::Game::id).collect());

        let mut reg = registry();
        for (name, game) in ["A", "B", "C"].into_iter().zip(games) {
            reg.add(player(name, &board), Box::new(game));
        }

        let data = snapshot(&reg, "board").unwrap();
        for name in ["A", "B", "C"] {
            assert_eq!(keys(data.heroes.get(name).unwrap()), vec!["A", "B", "C"]);
        }
    }

    #[test]
    fn stale_sibling_is_dropped() {
        let board = CountingType::shared("board");
        let probe = Arc::new(GameProbe::default());
        let a = CountingGame::on_board(Arc::clone(&probe));
        let b = CountingGame::on_board(Arc::clone(&probe));
        let stale = GameId::new();
        probe.set_group(vec![crate::game::Game::id(&a), stale, crate::game::Game::id(&b)]);

        let mut reg = registry();
        reg.add(player("A", &board), Box::new(a));
        reg.add(player("B", &board), Box::new(b));

        let data = snapshot(&reg, "board").unwrap();
        assert_eq!(keys(data.heroes.get("A").unwrap()), vec!["A", "B"]);
    }

    #[test]
    fn snapshots_cover_every_type() {
        let snake = CountingType::single("snake");
        let board = CountingType::shared("board");
        let mut reg = registry();
        reg.add(player("s1", &snake), Box::new(CountingGame::new()));
        reg.add(player("b1", &board), Box::new(CountingGame::new()));

        let all = snapshots(&reg);
        assert_eq!(keys(&all), vec!["board", "snake"]);
    }
}
