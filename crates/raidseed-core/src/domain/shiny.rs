//! PID shininess helpers

use crate::constants::{ANTI_SHINY_MASK, SHINY_THRESHOLD};
use crate::domain::types::{Shininess, ShinyRule, TrainerId};

/// Xor of the PID halves against the ID halves
#[inline]
pub fn shiny_xor(pid: u32, id32: u32) -> u32 {
    let v = pid ^ id32;
    (v >> 16) ^ (v & 0xFFFF)
}

#[inline]
pub fn classify(xor: u32) -> Shininess {
    match xor {
        0 => Shininess::Square,
        x if x < SHINY_THRESHOLD => Shininess::Star,
        _ => Shininess::None,
    }
}

/// Rewrite the PID's upper half so that its xor against `id32` equals `xor`
#[inline]
fn force_xor(pid: u32, id32: u32, xor: u32) -> u32 {
    let low = pid & 0xFFFF;
    let high = ((id32 >> 16) ^ (id32 & 0xFFFF) ^ low ^ xor) & 0xFFFF;
    (high << 16) | low
}

/// Xor type carried over from the throwaway roll: 0 stays square, anything else is a star
#[inline]
fn carried_xor(rolled: u32) -> u32 {
    if rolled == 0 { 0 } else { 1 }
}

/// Turn the rolled PID into the final PID for `trainer`
///
/// Raids roll shininess against a throwaway trainer ID (`fake_id`) and then
/// carry the result over to the real trainer. A PID that already has the
/// right state for the real trainer is kept as it is; otherwise a shiny roll
/// becomes a square (xor 0) or star (xor 1) shiny and a non-shiny roll gets
/// its shininess broken.
pub fn finalize_pid(rule: ShinyRule, pid: u32, fake_id: u32, trainer: TrainerId) -> u32 {
    let id32 = trainer.id32();
    let xor = shiny_xor(pid, id32);

    match rule {
        ShinyRule::Random => {
            let rolled = shiny_xor(pid, fake_id);
            match (rolled < SHINY_THRESHOLD, xor < SHINY_THRESHOLD) {
                (true, false) => force_xor(pid, id32, carried_xor(rolled)),
                (false, true) => pid ^ ANTI_SHINY_MASK,
                _ => pid,
            }
        }
        ShinyRule::Never if xor < SHINY_THRESHOLD => pid ^ ANTI_SHINY_MASK,
        ShinyRule::Never => pid,
        ShinyRule::Always => {
            // Shiny for the battle against the throwaway ID first
            let battled = if shiny_xor(pid, fake_id) < SHINY_THRESHOLD {
                pid
            } else {
                force_xor(pid, fake_id, 0)
            };
            if shiny_xor(battled, id32) < SHINY_THRESHOLD {
                battled
            } else {
                force_xor(battled, id32, carried_xor(shiny_xor(battled, fake_id)))
            }
        }
        ShinyRule::AlwaysSquare if xor != 0 => force_xor(pid, id32, 0),
        ShinyRule::AlwaysSquare => pid,
        ShinyRule::AlwaysStar if xor == 0 || xor >= SHINY_THRESHOLD => force_xor(pid, id32, 1),
        ShinyRule::AlwaysStar => pid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAINER: TrainerId = TrainerId {
        tid: 12345,
        sid: 54321,
    };

    #[test]
    fn test_classify() {
        assert_eq!(classify(0), Shininess::Square);
        assert_eq!(classify(1), Shininess::Star);
        assert_eq!(classify(15), Shininess::Star);
        assert_eq!(classify(16), Shininess::None);
        assert_eq!(classify(0xFFFF), Shininess::None);
    }

    #[test]
    fn test_force_xor() {
        for (pid, xor) in [(0x1234_5678u32, 0u32), (0xFFFF_0000, 1), (0, 7)] {
            let forced = force_xor(pid, TRAINER.id32(), xor);
            assert_eq!(forced & 0xFFFF, pid & 0xFFFF);
            assert_eq!(shiny_xor(forced, TRAINER.id32()), xor);
        }
    }

    #[test]
    fn test_anti_shiny_mask_breaks_shininess() {
        let shiny = force_xor(0xABCD_1234, TRAINER.id32(), 3);
        let broken = shiny ^ ANTI_SHINY_MASK;
        assert!(shiny_xor(broken, TRAINER.id32()) >= SHINY_THRESHOLD);
    }

    #[test]
    fn test_random_rule_carries_fake_roll() {
        let pid = 0x0102_0304;
        // fake ID equal to the PID: xor 0 against the throwaway trainer
        let square = finalize_pid(ShinyRule::Random, pid, pid, TRAINER);
        assert_eq!(shiny_xor(square, TRAINER.id32()), 0);

        // xor 5 against the throwaway trainer becomes a star (xor 1)
        let star = finalize_pid(ShinyRule::Random, pid, pid ^ 5, TRAINER);
        assert_eq!(shiny_xor(star, TRAINER.id32()), 1);
    }

    #[test]
    fn test_random_rule_non_shiny_roll_stays_non_shiny() {
        let pid = force_xor(0x0000_4444, TRAINER.id32(), 2);
        let fake_id = pid ^ 0x1000_0000;
        let result = finalize_pid(ShinyRule::Random, pid, fake_id, TRAINER);
        assert_eq!(classify(shiny_xor(result, TRAINER.id32())), Shininess::None);
    }

    #[test]
    fn test_forced_rules() {
        let pids = [0u32, 0x1234_5678, 0xFFFF_FFFF, force_xor(0x9999, TRAINER.id32(), 0)];
        for pid in pids {
            let id32 = TRAINER.id32();
            let class = |rule| classify(shiny_xor(finalize_pid(rule, pid, 0, TRAINER), id32));
            assert_eq!(class(ShinyRule::Never), Shininess::None);
            assert!(class(ShinyRule::Always).is_shiny());
            assert_eq!(class(ShinyRule::AlwaysSquare), Shininess::Square);
            assert_eq!(class(ShinyRule::AlwaysStar), Shininess::Star);
        }
    }

    #[test]
    fn test_random_rule_keeps_pid_already_shiny_for_trainer() {
        // Square against the throwaway ID, star (xor 5) against the trainer
        let trainer = TrainerId::new(0xE157, 0);
        let pid = 0x0ECF_EF9D;
        assert_eq!(shiny_xor(pid, trainer.id32()), 5);

        let result = finalize_pid(ShinyRule::Random, pid, pid, trainer);
        assert_eq!(result, pid);
        assert_eq!(classify(shiny_xor(result, trainer.id32())), Shininess::Star);
    }

    #[test]
    fn test_always_rule_carries_throwaway_star() {
        let pid = force_xor(0x0000_5555, TRAINER.id32(), 0x4000);

        // Star (xor 9) against the throwaway ID stays a star for the trainer
        let star = finalize_pid(ShinyRule::Always, pid, pid ^ 9, TRAINER);
        assert_eq!(shiny_xor(star, TRAINER.id32()), 1);
        assert_eq!(star & 0xFFFF, pid & 0xFFFF);

        // Non-shiny against the throwaway ID becomes square for both
        let square = finalize_pid(ShinyRule::Always, pid, pid ^ 0x1000_0000, TRAINER);
        assert_eq!(shiny_xor(square, TRAINER.id32()), 0);

        // Already shiny for the trainer: untouched
        let shiny = force_xor(pid, TRAINER.id32(), 7);
        assert_eq!(finalize_pid(ShinyRule::Always, shiny, shiny, TRAINER), shiny);
    }
}
