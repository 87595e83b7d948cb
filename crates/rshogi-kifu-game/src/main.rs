use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rshogi_kifu::record::{format_hmmss, format_mss, next_color_from_usi};
use rshogi_kifu::{Position, Record, RecordMove, SpecialMove};
use rshogi_kifu_game::GameSetting;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "棋譜の再生・USI出力・対局設定の確認")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// USI の指し手を順に並べ、usi / sfen を出力する
    Replay {
        /// 開始局面（省略時は平手）
        #[arg(long)]
        sfen: Option<String>,

        /// 出力前にこの手数へ移動する
        #[arg(long)]
        goto: Option<u32>,

        /// 棋譜を JSON で出力する
        #[arg(long)]
        json: bool,

        /// 指し手（"7g7f"、"P*5e"）または特殊手（"resign" など）
        moves: Vec<String>,
    },

    /// position コマンド文字列から次の手番を求める
    Turn {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        usi: Vec<String>,
    },

    /// 対局設定を読み込み TOML で出力する（省略時は既定値）
    Settings { path: Option<PathBuf> },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveView {
    number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    usi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    special: Option<SpecialMove>,
    text: String,
    elapsed: String,
    total_elapsed: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    comment: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordView {
    usi: String,
    sfen: String,
    current: u32,
    length: u32,
    moves: Vec<MoveView>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Replay { sfen, goto, json, moves } => replay(sfen.as_deref(), goto, json, &moves),
        Command::Turn { usi } => {
            println!("{}", next_color_from_usi(&usi.join(" ")));
            Ok(())
        }
        Command::Settings { path } => {
            let setting = match path {
                Some(path) => GameSetting::load(&path)
                    .with_context(|| format!("failed to load settings: {}", path.display()))?,
                None => GameSetting::default(),
            };
            print!("{}", setting.to_toml_string()?);
            Ok(())
        }
    }
}

fn replay(sfen: Option<&str>, goto: Option<u32>, json: bool, moves: &[String]) -> Result<()> {
    let mut record = match sfen {
        Some(sfen) => {
            let position = Position::from_sfen(sfen).context("invalid --sfen")?;
            Record::with_position(&position)
        }
        None => Record::new(),
    };

    for text in moves {
        let ply = record.current().number() + 1;
        let mv: RecordMove = match text.parse::<SpecialMove>() {
            Ok(special) => special.into(),
            Err(_) => match record.position().create_move_by_usi(text) {
                Some(mv) => mv.into(),
                None => bail!("illegal move at ply {ply}: {text}"),
            },
        };
        if !record.append(mv) {
            bail!("illegal move at ply {ply}: {text}");
        }
    }
    if let Some(number) = goto {
        record.goto(number);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&record_view(&record))?);
    } else {
        println!("{}", record.usi());
        println!("{}", record.sfen());
    }
    Ok(())
}

fn record_view(record: &Record) -> RecordView {
    let moves = record
        .move_ids()
        .into_iter()
        .filter_map(|id| Some((id, record.get(id)?)))
        .map(|(id, node)| {
            let (usi, special) = match node.record_move() {
                RecordMove::Move(mv) => (Some(mv.to_usi()), None),
                RecordMove::Special(special) => (None, Some(*special)),
            };
            MoveView {
                number: node.number(),
                usi,
                special,
                text: record.display_move_text(id).unwrap_or_default(),
                elapsed: format_mss(node.elapsed_ms()),
                total_elapsed: format_hmmss(node.total_elapsed_ms()),
                comment: node.comment().to_string(),
            }
        })
        .collect();
    RecordView {
        usi: record.usi(),
        sfen: record.sfen(),
        current: record.current().number(),
        length: record.length(),
        moves,
    }
}
