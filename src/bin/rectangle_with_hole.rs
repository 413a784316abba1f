use samples_core::{run, InitError, Sample};

fn main() -> Result<(), InitError> {
    run(Sample::RectangleWithHole)
}
