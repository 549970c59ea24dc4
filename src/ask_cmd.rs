use anyhow::Result;
use texthive::Engine;

pub fn run(engine: &Engine, question: &str, json: bool, verbose: u8) -> Result<()> {
    let snapshot = engine.snapshot();
    if verbose > 0 {
        eprintln!(
            "ask: {} indexed tokens over {} files",
            snapshot.index().token_count(),
            snapshot.corpus().len()
        );
    }

    let answer = snapshot.answer(question);
    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.text);
    }
    Ok(())
}
