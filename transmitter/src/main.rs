#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

extern crate panic_semihosting;

use cortex_m::peripheral::DWT;
use cortex_m_semihosting::hprintln;
use embedded_hal::adc::OneShot;
use rand_core::SeedableRng;
use rand_wyrand::WyRand;

use manchester::{ManchesterEncoder, MicrosClock, PulseTiming};
use oregon_emulator::{Device, ReadingSource, Station, Transmission};
use oregon_protocol::{MeasurementEncoder, Reading, HALF_PERIOD_US, PROFILES};

use stm32f1xx_hal::{
    self,
    prelude::*,
    adc::Adc,
    pac,
    gpio::{
        Analog, Output, PushPull, State,
        gpioa::{ PA0, PA8 },
        gpiob::PB12, // LED
    },
    stm32::ADC1,
    timer::{ Timer, CountDownTimer, Event },
};

type RfPin = PA8<Output<PushPull>>;

/// Microseconds from the DWT cycle counter. The counter itself wraps every
/// minute or so at 72 MHz; `now` folds it into a 64 bit total.
pub struct CycleClock {
    dwt: DWT,
    cycles_per_us: u32,
    last: u32,
    total: u64,
}

impl CycleClock {
    fn new(dwt: DWT, sysclk_hz: u32) -> Self {
        let last = dwt.cyccnt.read();
        CycleClock { dwt, cycles_per_us: sysclk_hz / 1_000_000, last, total: 0 }
    }
}

impl MicrosClock for CycleClock {
    fn now(&mut self) -> u32 {
        let count = self.dwt.cyccnt.read();
        self.total += count.wrapping_sub(self.last) as u64;
        self.last = count;
        (self.total / self.cycles_per_us as u64) as u32
    }
}

/// Photodiode on PA0 feeding the UV channel. The other sensor types have
/// nothing wired up and report zero.
pub struct UvProbe {
    adc: Adc<ADC1>,
    pin: PA0<Analog>,
}

impl UvProbe {
    fn raw(&mut self) -> u16 {
        nb::block!(self.adc.read(&mut self.pin)).unwrap_or(0)
    }
}

impl ReadingSource for UvProbe {
    fn reading(&mut self, encoder: MeasurementEncoder) -> Reading {
        match encoder {
            // 12 bit sample onto the 0-15 index scale
            MeasurementEncoder::Uv => Reading::Uv { index: (self.raw() >> 8) as u8 },
            other => Reading::zero(other),
        }
    }
}

#[rtic::app(device = stm32f1xx_hal::pac, peripherals = true)]
const APP: () = {
    struct Resources {
        station: Station<RfPin, CycleClock>,
        probe: UvProbe,
        timer: CountDownTimer<pac::TIM2>,
        led: PB12<Output<PushPull>>,
    }

    #[init]
    fn init(cx: init::Context) -> init::LateResources {
        let mut core = cx.core;
        let mut flash = cx.device.FLASH.constrain();
        let mut rcc = cx.device.RCC.constrain();

        let clocks = rcc
            .cfgr
            .use_hse(8.mhz())
            .sysclk(72.mhz())
            .pclk1(36.mhz())
            .freeze(&mut flash.acr);

        core.DCB.enable_trace();
        core.DWT.enable_cycle_counter();

        let mut gpiob = cx.device.GPIOB.split(&mut rcc.apb2);
        let led = gpiob.pb12.into_push_pull_output_with_state(&mut gpiob.crh, State::High);

        let mut gpioa = cx.device.GPIOA.split(&mut rcc.apb2);
        let rf = gpioa.pa8.into_push_pull_output_with_state(&mut gpioa.crh, State::Low);

        let mut probe = UvProbe {
            adc: Adc::adc1(cx.device.ADC1, &mut rcc.apb2, clocks),
            pin: gpioa.pa0.into_analog(&mut gpioa.crl),
        };

        let mut clock = CycleClock::new(core.DWT, clocks.sysclk().0);
        // ADC noise and boot timing make a good enough seed for the rolling codes
        let seed = u64::from(clock.now()) << 32 | u64::from(probe.raw()) << 16 | u64::from(probe.raw());
        // per device timing is applied before each frame
        let encoder = ManchesterEncoder::new(rf, clock, PulseTiming::nominal(HALF_PERIOD_US));
        let mut station = Station::new(encoder);

        let mut rng = WyRand::seed_from_u64(seed);
        for profile in PROFILES.iter() {
            match Device::power_on(*profile, &mut rng) {
                Ok(device) => {
                    let _ = hprintln!("{} rolling code {:02X}", profile.name, device.rolling_code().value());
                    if station.add_device(device).is_err() {
                        let _ = hprintln!("{}: no free slot", profile.name);
                    }
                }
                Err(e) => {
                    let _ = hprintln!("{}: {}", profile.name, e);
                }
            }
        }

        let mut timer = Timer::tim2(cx.device.TIM2, &clocks, &mut rcc.apb1).start_count_down(1.hz());
        timer.listen(Event::Update);

        init::LateResources {
            station,
            probe,
            timer,
            led,
        }
    }

    #[task(binds = TIM2, priority = 2,
        resources = [ station, timer ],
        spawn = [ transmit ])]
    fn second(c: second::Context) {
        c.resources.timer.clear_update_interrupt_flag();
        c.resources.station.tick();
        // fails only while a transmit is already queued, which covers this second too
        let _ = c.spawn.transmit();
    }

    #[task(resources = [ station, probe, led ])]
    fn transmit(mut c: transmit::Context) {
        let probe = c.resources.probe;
        let led = c.resources.led;
        let result = c.resources.station.lock(|station| {
            station.service(probe, |t: &Transmission| {
                let _ = led.toggle();
                let _ = hprintln!("{}", t);
            })
        });
        match result {
            Ok(_) => {}
            Err(never) => match never {},
        }
    }

    extern "C" {
        fn USART2();
    }
};
