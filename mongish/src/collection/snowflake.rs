use log::{debug, warn};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;

const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
// 2010-11-04T01:42:54.657Z
const EPOCH: u64 = 1288834974657;

struct SnowflakeState {
    last_timestamp: u64,
    sequence: u64,
}

/// Generates roughly time-ordered 64-bit ids for documents inserted without `_id`.
pub(crate) struct SnowflakeIdGenerator {
    node_id: u64,
    state: Mutex<SnowflakeState>,
}

impl SnowflakeIdGenerator {
    pub fn new() -> Self {
        let max_node_id = (1 << NODE_ID_BITS) - 1;
        let mut node_id = Self::random_node_id();
        if node_id > max_node_id {
            warn!("Node id can't be greater than {}", max_node_id);
            node_id = OsRng.gen_range(1..=max_node_id);
        }
        debug!("Initialized id generator with node id: {}", node_id);

        SnowflakeIdGenerator {
            node_id,
            state: Mutex::new(SnowflakeState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    pub fn next_id(&self) -> u64 {
        let sequence_mask = (1 << SEQUENCE_BITS) - 1;
        let mut state = self.state.lock();

        let mut timestamp = current_millis().max(EPOCH);
        if timestamp < state.last_timestamp {
            // clock moved backwards, keep issuing ids on the last known tick
            timestamp = state.last_timestamp;
        }

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & sequence_mask;
            if state.sequence == 0 {
                // sequence exhausted for this millisecond
                while timestamp <= state.last_timestamp {
                    std::hint::spin_loop();
                    timestamp = current_millis().max(state.last_timestamp + 1);
                }
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = timestamp;
        ((timestamp - EPOCH) << (NODE_ID_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }

    fn random_node_id() -> u64 {
        let uuid = uuid::Uuid::new_v4();
        let uid = uuid.as_bytes();
        let rnd_byte = OsRng.gen::<u64>() & 0x000000FF;

        ((0x000000FF & uid[uid.len() - 1] as u64) | (0x0000FF00 & (rnd_byte << 8))) >> 6
    }
}

fn current_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
