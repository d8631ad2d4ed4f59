//! Answer adjudication and scoring, run exactly once per question at reveal.

use super::acts::ActId;
use super::engine::{RevealOutcome, RevealReport};
use super::items::ItemId;
use super::room::Room;

impl Room {
    /// Settle the current question for every player who was still in the game
    /// when reveal started. Marks the question locked so late submissions are
    /// rejected from this point on.
    pub(crate) fn adjudicate(&mut self, _now_ms: i64) -> RevealReport {
        let Some(q) = self.current_question.as_mut() else {
            return RevealReport {
                outcomes: Vec::new(),
                game_over: false,
                boss_defeated: false,
            };
        };
        q.locked = true;

        let correct_index = q.question.correct_index;
        let value = q.question.value;
        let hard = q.question.hard;
        let started_at = q.started_at;
        let duration_ms = q.duration_ms();
        let answers = q.answers.clone();
        let lockins = q.lockin_time.clone();

        let act = self.current_act().unwrap_or(ActId::Homeroom);
        let act_cfg = act.config();
        let is_wager = act == ActId::WagerRound;

        let mut outcomes = Vec::new();
        let mut boss_hits: u64 = 0;

        for player in self.players.values_mut() {
            if player.eliminated {
                continue;
            }

            let score_before = player.score;
            let coins_before = player.coins;
            let lives_before = player.lives;

            let your_answer = answers.get(&player.id).copied();
            let correct = your_answer == Some(correct_index);

            let mut speed_bonus: u64 = 0;
            let mut shield_used = false;
            let mut double_points_used = false;
            let mut buyback_used = false;
            let mut wager_amount = None;

            if is_wager {
                // Settle the wager: clamp to what the player can actually
                // cover at reveal, then pay out or collect.
                let w = player.wager.min(player.score);
                if correct {
                    player.score += w;
                } else {
                    player.score -= w;
                }
                wager_amount = Some(w);
                player.wager_swap_used = false;
            } else if correct {
                if act_cfg.speed_bonus_max > 0 && duration_ms > 0 {
                    if let Some(lockin) = lockins.get(&player.id) {
                        let elapsed = (lockin - started_at).max(0);
                        #[allow(clippy::cast_precision_loss)]
                        let frac_remaining = (1.0 - elapsed as f64 / duration_ms as f64).max(0.0);
                        #[allow(
                            clippy::cast_precision_loss,
                            clippy::cast_possible_truncation,
                            clippy::cast_sign_loss
                        )]
                        {
                            speed_bonus = (act_cfg.speed_bonus_max as f64 * frac_remaining).floor()
                                as u64;
                        }
                    }
                }

                let mut multiplier: u64 = 1;
                if player.buffs.double_points {
                    multiplier = 2;
                    player.consume_item(ItemId::DoublePoints);
                    player.buffs.double_points = false;
                    double_points_used = true;
                }

                #[allow(
                    clippy::cast_precision_loss,
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss
                )]
                let base = ((value * multiplier) as f64 * act_cfg.score_multiplier).floor() as u64;
                player.score += base + speed_bonus;
                player.coins += act_cfg.coin_reward_base;
                if self.boss_state.is_some() {
                    boss_hits += 1;
                }
            } else {
                let hearts_at_risk =
                    act_cfg.hearts_at_risk || (act_cfg.hearts_only_on_hard && hard);
                if hearts_at_risk {
                    if player.buffs.shield {
                        player.consume_item(ItemId::Shield);
                        player.buffs.shield = false;
                        shield_used = true;
                    } else {
                        player.lives = player.lives.saturating_sub(1);
                        if player.lives == 0 {
                            if player.consume_item(ItemId::BuybackToken) {
                                player.lives = 1;
                                buyback_used = true;
                            } else {
                                player.eliminated = true;
                            }
                        }
                    }
                }
            }

            #[allow(clippy::cast_possible_wrap)]
            outcomes.push(RevealOutcome {
                player_id: player.id.clone(),
                correct_index,
                your_answer,
                correct,
                score_delta: player.score as i64 - score_before as i64,
                coins_delta: player.coins as i64 - coins_before as i64,
                lives_delta: player.lives as i64 - lives_before as i64,
                speed_bonus,
                shield_used,
                double_points_used,
                buyback_used,
                eliminated: player.eliminated,
                wager: wager_amount,
            });
        }

        if let Some(boss) = self.boss_state.as_mut() {
            boss.hp = boss.hp.saturating_sub(boss_hits);
        }
        if is_wager {
            self.wager_state = None;
        }

        let boss_defeated = self.boss_state.is_some_and(|b| b.hp == 0);
        let game_over = self.alive_count() == 0 || boss_defeated;

        RevealReport {
            outcomes,
            game_over,
            boss_defeated,
        }
    }
}
