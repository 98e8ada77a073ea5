use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

static WORDS_DIR: Dir = include_dir!("src/words");

/// One embedded word bank as stored in `src/words`.
#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
pub struct Bank {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

pub(crate) fn read_bank(file_name: &str) -> Bank {
    let file = WORDS_DIR
        .get_file(file_name)
        .expect("Word bank file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    from_str(file_as_str).expect("Unable to deserialize word bank json")
}
