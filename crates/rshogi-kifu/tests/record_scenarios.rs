use rshogi_kifu::record::next_color_from_usi;
use rshogi_kifu::{Color, NodeId, Position, Record, RecordMove, SFEN_HIRATE, SpecialMove};

fn play(record: &mut Record, usi: &str) {
    let mv = record.position().create_move_by_usi(usi).unwrap();
    assert!(record.append(mv), "append {usi}");
}

/// 開始局面から指定手順を並べた局面
fn replay(moves: &[&str]) -> Position {
    let mut pos = Position::new();
    for usi in moves {
        let mv = pos.create_move_by_usi(usi).unwrap();
        assert!(pos.is_valid_move(&mv));
        pos.do_move(&mv);
    }
    pos
}

fn scenario_a() -> Record {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    play(&mut record, "3c3d");
    record.go_back();
    play(&mut record, "8c8d");
    record
}

#[test]
fn scenario_a_creates_sibling() {
    let record = scenario_a();
    assert_eq!(record.current().number(), 2);
    assert_eq!(record.current().branch_index(), 1);

    let begin = record.branch_begin().unwrap();
    assert_eq!(begin.branch_index(), 0);
    assert!(!begin.is_active_branch());
    assert_eq!(begin.record_move().as_move().unwrap().to_usi(), "3c3d");
    assert!(record.current().is_active_branch());
    assert_eq!(record.position(), &replay(&["7g7f", "8c8d"]));
}

#[test]
fn scenario_b_switches_branch() {
    let mut record = scenario_a();
    assert!(record.switch_branch_by_index(0));
    assert_eq!(record.current().branch_index(), 0);
    assert!(record.current().is_active_branch());
    assert_eq!(record.current().record_move().as_move().unwrap().to_usi(), "3c3d");
    assert_eq!(record.position(), &replay(&["7g7f", "3c3d"]));

    let mut active = 0;
    record.for_each(|_, node| {
        if node.number() == 2 && node.is_active_branch() {
            active += 1;
        }
    });
    assert_eq!(active, 1);
}

#[test]
fn scenario_c_remove_after_prunes_subtree() {
    let mut record = Record::new();
    for usi in ["7g7f", "3c3d", "2g2f", "8c8d", "2f2e"] {
        play(&mut record, usi);
    }
    record.goto(3);
    play(&mut record, "4a3b");
    record.goto(4);
    record.goto(3);
    assert_eq!(record.current().number(), 3);

    record.remove_after();
    assert_eq!(record.current().number(), 2);
    assert!(record.current().next().is_none());
    assert_eq!(record.length(), 2);
    assert_eq!(record.position(), &replay(&["7g7f", "3c3d"]));

    let mut max = 0;
    record.for_each(|_, node| max = max.max(node.number()));
    assert_eq!(max, 2);
}

#[test]
fn scenario_d_usi_export() {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    let usi = record.usi();
    assert_eq!(usi, format!("position sfen {SFEN_HIRATE} moves 7g7f"));
    let tokens: Vec<&str> = usi.split(' ').collect();
    assert_eq!(tokens[0], "position");
    assert_eq!(tokens[tokens.len() - 2], "moves");
    assert_eq!(next_color_from_usi(&usi), Color::White);
}

#[test]
fn usi_skips_special_moves_and_follows_cursor() {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    play(&mut record, "3c3d");
    assert!(record.append(SpecialMove::Resign));
    assert!(record.usi().ends_with("moves 7g7f 3c3d"));

    record.goto(1);
    assert!(record.usi().ends_with("moves 7g7f"));
}

#[test]
fn sfen_export_uses_cursor_ply() {
    let mut record = Record::new();
    assert_eq!(record.sfen(), format!("position sfen {SFEN_HIRATE}"));
    play(&mut record, "7g7f");
    assert_eq!(
        record.sfen(),
        "position sfen lnsgkgsnl/1r5b1/ppppppppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL w - 2"
    );
}

#[test]
fn back_forward_round_trip() {
    let mut record = Record::new();
    for usi in ["7g7f", "3c3d", "8h2b+", "3a2b", "B*4e"] {
        play(&mut record, usi);
    }
    record.goto(2);
    for _ in 0..3 {
        let (id, pos) = (record.current_id(), record.position().clone());
        assert!(record.go_back());
        assert!(record.go_forward());
        assert_eq!(record.current_id(), id);
        assert_eq!(record.position(), &pos);

        assert!(record.go_forward());
        assert!(record.go_back());
        assert_eq!(record.current_id(), id);
        assert_eq!(record.position(), &pos);
        record.go_forward();
    }
    record.goto(u32::MAX);
    assert_eq!(record.current().number(), 5);
    assert_eq!(record.position(), &replay(&["7g7f", "3c3d", "8h2b+", "3a2b", "B*4e"]));
}

#[test]
fn append_same_move_is_idempotent() {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    let first = record.current_id();
    record.go_back();
    play(&mut record, "7g7f");
    assert_eq!(record.current_id(), first);

    let mut count = 0;
    record.for_each(|_, _| count += 1);
    assert_eq!(count, 2);

    assert!(record.append(SpecialMove::Interrupt));
    let interrupt = record.current_id();
    assert!(record.append(SpecialMove::Interrupt));
    assert_eq!(record.current_id(), interrupt);
}

#[test]
fn numbering_along_every_path() {
    let mut record = Record::new();
    for usi in ["7g7f", "3c3d", "2g2f"] {
        play(&mut record, usi);
    }
    record.goto(1);
    play(&mut record, "8c8d");
    play(&mut record, "6i7h");

    record.for_each(|id, node| {
        if let Some(parent) = node.parent() {
            let parent_number = record.get(parent).unwrap().number();
            assert_eq!(node.number(), parent_number + 1, "node {id:?}");
        } else {
            assert_eq!(id, NodeId::ROOT);
            assert_eq!(node.number(), 0);
        }
    });
}

#[test]
fn elapsed_time_sums_every_other_ancestor() {
    let mut record = Record::new();
    let line = ["7g7f", "3c3d", "2g2f", "8c8d", "2f2e", "8d8e"];
    for (i, usi) in line.iter().enumerate() {
        play(&mut record, usi);
        let id = record.current_id();
        record.set_elapsed_ms(id, (i as u64 + 1) * 1000);
    }

    let nodes = record.moves();
    for (d, node) in nodes.iter().enumerate() {
        let expected: u64 =
            (0..=d).rev().step_by(2).map(|a| nodes[a].elapsed_ms()).sum();
        assert_eq!(node.total_elapsed_ms(), expected, "depth {d}");
    }
    assert_eq!(nodes[6].total_elapsed_ms(), 2000 + 4000 + 6000);
    assert_eq!(nodes[5].total_elapsed_ms(), 1000 + 3000 + 5000);
}

#[test]
fn new_branch_inherits_cumulative_time() {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    let id = record.current_id();
    record.set_elapsed_ms(id, 3000);
    play(&mut record, "3c3d");
    play(&mut record, "2g2f");
    assert_eq!(record.current().total_elapsed_ms(), 3000);
}

#[test]
fn comments_and_custom_data_survive_navigation() {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    record.current_mut().set_comment("角道を開ける");
    record.current_mut().set_custom_data(Some("{\"score\":30}".to_string()));
    record.go_back();
    record.go_forward();
    assert_eq!(record.current().comment(), "角道を開ける");
    assert_eq!(record.current().custom_data(), Some("{\"score\":30}"));
}

#[test]
fn record_from_custom_position() {
    let pos = Position::from_sfen("8k/9/9/9/9/9/9/9/K8 w G 1").unwrap();
    let mut record = Record::with_position(&pos);
    assert!(!record.position().is_hirate());
    play(&mut record, "1a1b");
    assert_eq!(record.usi(), "position sfen 8k/9/9/9/9/9/9/9/K8 w G 1 moves 1a1b");
    assert_eq!(next_color_from_usi(&record.usi()), Color::Black);
    assert_eq!(record.current().record_move().as_move().map(|m| m.color()), Some(Color::White));
    assert!(matches!(record.first().record_move(), RecordMove::Special(SpecialMove::Start)));
}

#[test]
fn branch_begin_is_none_at_start() {
    let mut record = Record::new();
    assert!(record.branch_begin().is_none());

    play(&mut record, "7g7f");
    assert!(record.go_back());
    assert!(record.branch_begin().is_none());

    assert!(record.go_forward());
    let begin = record.branch_begin().and_then(|n| n.record_move().as_move());
    assert_eq!(begin.map(|m| m.to_usi()).as_deref(), Some("7g7f"));
}

#[test]
fn clear_without_position_keeps_initial_position() {
    let pos = Position::from_sfen("8k/9/9/9/9/9/9/9/K8 w G 1").unwrap();
    let mut record = Record::with_position(&pos);
    play(&mut record, "1a1b");
    assert_ne!(record.position(), &pos);

    record.clear(None);
    assert_eq!(record.current_id(), NodeId::ROOT);
    assert_eq!(record.length(), 0);
    assert_eq!(record.initial_position(), &pos);
    assert_eq!(record.position(), &pos);
    assert_eq!(record.usi(), "position sfen 8k/9/9/9/9/9/9/9/K8 w G 1 moves");
}

#[test]
fn surviving_handles_stay_valid_after_remove_after() {
    let mut record = Record::new();
    play(&mut record, "7g7f");
    play(&mut record, "3c3d");
    let pruned = record.current_id();
    record.goto(0);
    play(&mut record, "2g2f");
    let branch = record.current_id();
    play(&mut record, "8c8d");

    record.goto(1);
    assert!(record.switch_branch_by_index(0));
    record.goto(2);
    assert_eq!(record.current_id(), pruned);
    record.remove_after();

    let mv = record.get(branch).and_then(|n| n.record_move().as_move());
    assert_eq!(mv.map(|m| m.to_usi()).as_deref(), Some("2g2f"));
    assert!(record.set_elapsed_ms(branch, 9000));
    assert_eq!(record.get(branch).map(|n| n.elapsed_ms()), Some(9000));

    let mut elapsed = Vec::new();
    record.for_each(|_, node| {
        if let Some(mv) = node.record_move().as_move() {
            elapsed.push((mv.to_usi(), node.elapsed_ms()));
        }
    });
    assert_eq!(
        elapsed,
        vec![("7g7f".to_string(), 0), ("2g2f".to_string(), 9000), ("8c8d".to_string(), 0)]
    );

    assert!(record.get(pruned).is_none());
    assert!(!record.set_elapsed_ms(pruned, 1000));
    assert_eq!(record.display_move_text(pruned), None);
}
