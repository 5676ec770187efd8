pub mod fft_2d;
pub mod field;
pub mod kernel;
pub mod plane;
pub mod volume;
pub mod wave_num;
