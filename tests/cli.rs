use std::fs;
use std::process::Command;

const CONFIG: &str = r#"[filenames]
mult_files = "%tracknumber% - %title%|lower"
mult_files_va = "%tracknumber% - %artist% - %title%|lower"
single_file = "%albumartist% - %album%|lower"
"#;

const CUE: &str = "PERFORMER \"Band\"
TITLE \"Album\"
FILE \"missing.wav\" WAVE
  TRACK 01 AUDIO
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    INDEX 01 01:00:00
";

fn cueshift() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cueshift"))
}

#[test]
fn missing_audio_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let cue = dir.path().join("album.cue");
    let out = dir.path().join("out.cue");
    fs::write(&config, CONFIG).unwrap();
    fs::write(&cue, CUE).unwrap();

    let output = cueshift()
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .arg(&cue)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.wav"));
    assert!(!out.exists());
}

#[test]
fn version_mentions_build_target() {
    let output = cueshift().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("cueshift "));
}
