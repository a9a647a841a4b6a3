//! Variable-format field selection

// crate modules
use gray_physics::Interaction;

/// Which optional fields the variable record layout carries
///
/// The header stores this as a bitfield so readers can decode files written
/// with any selection. Bits are assigned in field order, time lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFlags {
    pub time: bool,
    pub energy: bool,
    pub pos: bool,
    pub log: bool,
    pub decay_id: bool,
    pub det_id: bool,
    pub scatter_counts: bool,
    pub src_id: bool,
    pub mat_id: bool,
    pub coinc_id: bool,
}

impl WriteFlags {
    /// Everything on
    pub fn all() -> Self {
        Self {
            time: true,
            energy: true,
            pos: true,
            log: true,
            decay_id: true,
            det_id: true,
            scatter_counts: true,
            src_id: true,
            mat_id: true,
            coinc_id: true,
        }
    }

    pub fn to_mask(self) -> u32 {
        [
            self.time,
            self.energy,
            self.pos,
            self.log,
            self.decay_id,
            self.det_id,
            self.scatter_counts,
            self.src_id,
            self.mat_id,
            self.coinc_id,
        ]
        .iter()
        .enumerate()
        .filter(|(_, &set)| set)
        .fold(0, |mask, (bit, _)| mask | 1 << bit)
    }

    pub fn from_mask(mask: u32) -> Self {
        let bit = |index: u32| mask & (1 << index) != 0;
        Self {
            time: bit(0),
            energy: bit(1),
            pos: bit(2),
            log: bit(3),
            decay_id: bit(4),
            det_id: bit(5),
            scatter_counts: bit(6),
            src_id: bit(7),
            mat_id: bit(8),
            coinc_id: bit(9),
        }
    }
}

impl Default for WriteFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Pack the interaction summary word
///
/// Bits 0-2 interaction type (signed, two's complement in 3 bits), 3-5
/// color, 6-9 total scatter count, 10-17 material id, 18-25 source id.
pub(crate) fn pack_log(interaction: &Interaction) -> i32 {
    let type_bits = interaction.type_.as_i32() & 0x7;
    let scatters = (interaction.scatter_compton_phantom
        + interaction.scatter_compton_detector
        + interaction.scatter_rayleigh_phantom
        + interaction.scatter_rayleigh_detector)
        .min(15);
    type_bits
        | (interaction.color & 0x7) << 3
        | scatters << 6
        | (interaction.mat_id & 0xff) << 10
        | (interaction.src_id & 0xff) << 18
}

/// Unpack the summary word into (type, color, scatters, mat id, src id)
pub(crate) fn unpack_log(log: i32) -> (i32, i32, i32, i32, i32) {
    let mut type_bits = log & 0x7;
    if type_bits > 3 {
        // sign-extend the 3-bit error codes
        type_bits -= 8;
    }
    (
        type_bits,
        (log >> 3) & 0x7,
        (log >> 6) & 0xf,
        (log >> 10) & 0xff,
        (log >> 18) & 0xff,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gray_physics::InteractionType;

    #[test]
    fn mask_round_trips() {
        let mut flags = WriteFlags::all();
        flags.pos = false;
        flags.coinc_id = false;
        let mask = flags.to_mask();
        assert_eq!(WriteFlags::from_mask(mask), flags);
        assert_eq!(mask & (1 << 2), 0);
        assert_eq!(mask & 1, 1);
    }

    #[test]
    fn log_word_round_trips() {
        let interaction = Interaction {
            type_: InteractionType::Photoelectric,
            color: 2,
            mat_id: 7,
            src_id: 3,
            scatter_compton_phantom: 2,
            scatter_rayleigh_detector: 1,
            ..Default::default()
        };
        let (type_, color, scatters, mat_id, src_id) = unpack_log(pack_log(&interaction));
        assert_eq!(type_, 1);
        assert_eq!(color, 2);
        assert_eq!(scatters, 3);
        assert_eq!(mat_id, 7);
        assert_eq!(src_id, 3);
    }

    #[test]
    fn error_types_survive_the_three_bit_field() {
        for type_ in [
            InteractionType::ErrorEmpty,
            InteractionType::ErrorTraceDepth,
            InteractionType::ErrorMatch,
        ] {
            let interaction = Interaction {
                type_,
                ..Default::default()
            };
            let (decoded, ..) = unpack_log(pack_log(&interaction));
            assert_eq!(decoded, type_.as_i32());
        }
    }
}
