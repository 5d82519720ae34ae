use crate::*;
pub use random::*;

mod random;

pub trait MineGenerator {
    fn generate(self, config: MinesConfig) -> Result<MineLayout>;
}

/// Fixed layout, handy for replaying a recorded round.
impl MineGenerator for MineLayout {
    fn generate(self, config: MinesConfig) -> Result<MineLayout> {
        if self.config() != config {
            return Err(GameError::InvalidConfiguration {
                mines: self.mine_count(),
                total_cells: config.total_cells(),
            });
        }
        Ok(self)
    }
}
