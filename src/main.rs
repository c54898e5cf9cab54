//! Strata — GPT transformer explorer. Runs the gpt_explorer app.

use bevy::prelude::*;
use gpt_explorer::prelude::*;

fn main() -> AppExit {
    let _ = dotenvy::dotenv();

    VisualizerBuilder::new()
        .model_config()
        .window_title("Strata — GPT Architecture")
        .build()
        .run()
}
