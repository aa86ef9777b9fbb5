// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod i2c_mock;

pub(crate) use i2c_mock::{
    example_pixels, mock_amg88xx_at_address, I2cOperation, MockError, MockSensorBus,
};
