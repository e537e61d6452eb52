pub mod capture;
pub mod device;
pub mod microphone;
pub mod pump;

pub use capture::{CaptureHandle, CaptureNode};
pub use device::DeviceManager;
pub use microphone::Microphone;
pub use pump::{to_pcm16, AudioPump, PumpHandle};

use ringbuf::traits::Split;
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Create a ring buffer split into producer and consumer halves.
pub fn create_ring_buffer(capacity: usize) -> (HeapProd<f32>, HeapCons<f32>) {
    HeapRb::<f32>::new(capacity).split()
}
