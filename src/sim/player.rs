//! Player kinematics
//!
//! Auto-run plus steering, gravity, and the single/double/triple jump rules.

use super::drops::TimedBuff;
use super::events::{GameEvent, SoundEffect};
use super::state::{Camera, Player, PowerId, RunState};
use crate::consts::*;

/// Jump power multipliers
pub const JUMP_BOOST_MULTIPLIER: f32 = 1.2;
pub const SHADOW_LEAP_MULTIPLIER: f32 = 1.15;

/// Steering requested by the input collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub left: bool,
    pub right: bool,
}

fn jump_multiplier(run: &RunState) -> f32 {
    let mut multiplier = 1.0;
    if run.drop_buffs.is_active(TimedBuff::JumpBoost) {
        multiplier *= JUMP_BOOST_MULTIPLIER;
    }
    if run.has_power(PowerId::ShadowLeap) {
        multiplier *= SHADOW_LEAP_MULTIPLIER;
    }
    multiplier
}

/// Start a jump if the rules allow one; returns true if the player jumped
///
/// Grounded players jump, airborne players get one double jump, and a third
/// jump while Jump Boost is active.
pub fn request_jump(player: &mut Player, run: &RunState, events: &mut Vec<GameEvent>) -> bool {
    let multiplier = jump_multiplier(run);
    let power = if player.grounded {
        player.grounded = false;
        player.jumping = true;
        JUMP_POWER
    } else if !player.double_jump_used {
        player.double_jump_used = true;
        DOUBLE_JUMP_POWER
    } else if !player.triple_jump_used && run.drop_buffs.is_active(TimedBuff::JumpBoost) {
        player.triple_jump_used = true;
        TRIPLE_JUMP_POWER
    } else {
        return false;
    };

    player.vel.y = power * multiplier;
    player.jump_hold_time = 0.0;
    events.push(GameEvent::Sound(SoundEffect::Jump));
    true
}

/// Integrate one tick of movement and keep the camera following
pub fn update_player(
    player: &mut Player,
    camera: &mut Camera,
    run: &RunState,
    intent: MovementIntent,
    jump_held: bool,
    dt: f32,
) {
    // Horizontal: auto-run plus steering
    let steer = match (intent.left, intent.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    if steer != 0.0 {
        player.facing = steer;
    }
    player.vel.x = run.game_speed * run.speed_multiplier + steer * PLAYER_MOVE_SPEED;
    player.pos.x += player.vel.x * dt;

    // Holding jump stretches the first jump
    if player.jumping && jump_held && player.jump_hold_time < MAX_JUMP_HOLD && player.vel.y < 0.0 {
        player.vel.y -= JUMP_HOLD_BOOST * dt;
        player.jump_hold_time += dt;
    }

    player.vel.y += GRAVITY * dt;
    player.pos.y += player.vel.y * dt;

    let ground = player.ground_y();
    if player.pos.y >= ground {
        player.pos.y = ground;
        player.vel.y = 0.0;
        player.grounded = true;
        player.jumping = false;
        player.double_jump_used = false;
        player.triple_jump_used = false;
        player.jump_hold_time = 0.0;
    }

    if player.damage_resistance > 0.0 {
        player.damage_resistance = (player.damage_resistance - dt).max(0.0);
    }

    camera.follow(player.pos.x);
    player.pos.x = player.pos.x.max(camera.left_edge());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn setup() -> (Player, Camera, RunState) {
        (Player::default(), Camera::default(), RunState::new(&Tuning::default()))
    }

    #[test]
    fn test_jump_then_double_then_no_more() {
        let (mut player, _, run) = setup();
        let mut events = Vec::new();
        assert!(request_jump(&mut player, &run, &mut events));
        assert_eq!(player.vel.y, JUMP_POWER);
        assert!(request_jump(&mut player, &run, &mut events));
        assert_eq!(player.vel.y, DOUBLE_JUMP_POWER);
        assert!(!request_jump(&mut player, &run, &mut events));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_triple_jump_needs_jump_boost() {
        let (mut player, _, mut run) = setup();
        run.drop_buffs.extend(TimedBuff::JumpBoost, 600.0);
        let mut events = Vec::new();
        request_jump(&mut player, &run, &mut events);
        assert_eq!(player.vel.y, JUMP_POWER * JUMP_BOOST_MULTIPLIER);
        request_jump(&mut player, &run, &mut events);
        assert!(request_jump(&mut player, &run, &mut events));
        assert!(player.triple_jump_used);
    }

    #[test]
    fn test_lands_and_resets_jumps() {
        let (mut player, mut camera, run) = setup();
        let mut events = Vec::new();
        request_jump(&mut player, &run, &mut events);
        request_jump(&mut player, &run, &mut events);
        let mut ticks = 0;
        loop {
            update_player(&mut player, &mut camera, &run, MovementIntent::default(), false, 1.0);
            ticks += 1;
            if player.grounded {
                break;
            }
            assert!(ticks < 200);
        }
        assert_eq!(player.pos.y, player.ground_y());
        assert!(!player.double_jump_used);
    }

    #[test]
    fn test_holding_jump_goes_higher() {
        let run = RunState::new(&Tuning::default());
        let peak = |held: bool| {
            let mut player = Player::default();
            let mut camera = Camera::default();
            request_jump(&mut player, &run, &mut Vec::new());
            let mut top = player.pos.y;
            for _ in 0..120 {
                update_player(&mut player, &mut camera, &run, MovementIntent::default(), held, 1.0);
                top = top.min(player.pos.y);
            }
            top
        };
        assert!(peak(true) < peak(false));
    }

    #[test]
    fn test_steering_and_camera_clamp() {
        let (mut player, mut camera, run) = setup();
        let start = player.pos.x;
        update_player(
            &mut player,
            &mut camera,
            &run,
            MovementIntent { left: true, right: false },
            false,
            1.0,
        );
        assert_eq!(player.facing, -1.0);
        assert_eq!(player.pos.x, start + run.game_speed - PLAYER_MOVE_SPEED);

        camera.x = player.pos.x + 50.0;
        update_player(&mut player, &mut camera, &run, MovementIntent::default(), false, 1.0);
        assert!(player.pos.x >= camera.left_edge());
    }
}
