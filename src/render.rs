//! Presentation layer.
//!
//! The core's only obligation to a renderer is a stable, fully-reconciled
//! snapshot per generation; how it is drawn is the renderer's business, and
//! a failing renderer never touches the simulation.

use std::io::{self, Write};

use crate::grid::{ALIVE, GridSnapshot};

pub trait Renderer {
    fn frame(&mut self, snapshot: &GridSnapshot) -> io::Result<()>;
}

/// Terminal renderer: cursor-home + clear, a generation/population header,
/// then one character per cell.
pub struct AsciiRenderer<W: Write> {
    out: W,
}

impl AsciiRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn frame(&mut self, snapshot: &GridSnapshot) -> io::Result<()> {
        write!(self.out, "\x1b[H\x1b[2J")?;
        writeln!(
            self.out,
            "generation {}  population {}",
            snapshot.generation,
            snapshot.population()
        )?;
        let mut line = String::with_capacity(snapshot.size);
        for row in 0..snapshot.size {
            line.clear();
            for col in 0..snapshot.size {
                line.push(if snapshot.get(row, col) == ALIVE { '#' } else { '.' });
            }
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::{AsciiRenderer, Renderer};
    use crate::grid::GridSnapshot;

    #[test]
    fn frame_draws_every_cell() {
        let snapshot = GridSnapshot {
            size: 3,
            generation: 7,
            cells: vec![1, 0, 0, 0, 1, 0, 0, 0, 1],
        };
        let mut buffer = Vec::new();
        AsciiRenderer::new(&mut buffer).frame(&snapshot).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("generation 7  population 3"));
        assert!(text.contains("#.."));
        assert!(text.contains(".#."));
        assert!(text.contains("..#"));
    }
}
